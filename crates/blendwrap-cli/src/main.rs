//! Blendwrap - run Blender exports as build actions.

use std::process::ExitCode;

use blendwrap_cli::{commands, logging, role::ProcessRole};
use blendwrap_process::WrapperConfig;
use blendwrap_spec::CodedError;

fn main() -> ExitCode {
    let config = WrapperConfig::from_env();
    logging::init(config.debug);

    let role = match ProcessRole::detect(|key| std::env::var(key).ok()) {
        Ok(role) => role,
        Err(e) => {
            eprintln!(
                "{} [{}]: {}",
                colored::Colorize::red("error"),
                e.code(),
                e
            );
            return ExitCode::from(1);
        }
    };

    let result = match role {
        ProcessRole::Launcher => commands::launch::run(config, std::env::args().skip(1).collect()),
        ProcessRole::Callback(payload) => commands::callback::run(&payload, &config.reserved_keys),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
