//! Launcher tests against fake Blender executables.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use blendwrap_process::{
    BridgeMode, ExitCheck, Launcher, OutputCheck, OutputMode, ScratchState, WrapperConfig,
    SCRATCH_PREFIX,
};
use blendwrap_spec::{
    ExportArguments, InvocationRequest, OutputDeclaration, ReservedKeys, TransferArtifact,
    ARTIFACT_FILE_NAME,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(fixture.scratch_root()).unwrap();
        fs::create_dir_all(fixture.out_dir()).unwrap();
        fs::write(fixture.path("scene.blend"), b"BLENDER").unwrap();
        fs::write(fixture.path("main.py"), b"").unwrap();
        fixture
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scratch_root(&self) -> PathBuf {
        self.path("tmp")
    }

    fn out_dir(&self) -> PathBuf {
        self.path("out")
    }

    /// Writes an executable shell script standing in for Blender.
    fn fake_blender(&self, body: &str) -> PathBuf {
        let path = self.path("blender");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn request(&self, blender: PathBuf, outputs: &[(&str, &str)]) -> InvocationRequest {
        InvocationRequest::new(
            blender,
            self.path("main.py"),
            self.path("scene.blend"),
            outputs
                .iter()
                .map(|(key, name)| OutputDeclaration::new(*key, self.out_dir().join(name)))
                .collect(),
            ExportArguments::parse_json(
                r#"{"export_materials": "EXPORT", "export_extras": {"keep": [1, 2.5, null]}}"#,
            )
            .unwrap(),
            &ReservedKeys::default(),
        )
        .unwrap()
    }

    fn launcher(&self) -> Launcher {
        Launcher::new(
            WrapperConfig::default()
                .temp_root(self.scratch_root())
                .output_mode(OutputMode::Buffered),
        )
    }

    fn scratch_dirs(&self) -> Vec<PathBuf> {
        fs::read_dir(self.scratch_root())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(SCRATCH_PREFIX)
            })
            .collect()
    }
}

fn touch_all(outputs: &[&Path]) -> String {
    outputs
        .iter()
        .map(|p| format!("touch '{}'", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_success_removes_scratch() {
    let fx = Fixture::new();
    let gltf = fx.out_dir().join("scene.gltf");
    let bin = fx.out_dir().join("scene.bin");
    let blender = fx.fake_blender(&touch_all(&[&gltf, &bin]));
    let request = fx.request(blender, &[("gltf", "scene.gltf"), ("bin", "scene.bin")]);

    let report = fx.launcher().run(&request).unwrap();

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.scratch, ScratchState::Removed);
    assert!(fx.scratch_dirs().is_empty());
    assert!(gltf.exists() && bin.exists());
}

#[test]
fn test_nonzero_exit_is_authoritative() {
    let fx = Fixture::new();
    let glb = fx.out_dir().join("scene.glb");
    let blender = fx.fake_blender(&format!("{}\necho boom 1>&2\nexit 4", touch_all(&[&glb])));
    let request = fx.request(blender, &[("glb", "scene.glb")]);

    let report = fx.launcher().run(&request).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 4);
    assert_eq!(report.verdict.exit, ExitCheck::Failed { code: 4 });
    assert_eq!(report.verdict.outputs, OutputCheck::AllPresent);
    assert!(report.output.unwrap().contains("boom"));

    let ScratchState::Preserved(scratch) = report.scratch else {
        panic!("scratch directory should be preserved");
    };
    assert!(scratch.join(ARTIFACT_FILE_NAME).is_file());
}

#[test]
fn test_silent_failure_detected_by_output_check() {
    let fx = Fixture::new();
    let gltf = fx.out_dir().join("scene.gltf");
    let glb = fx.out_dir().join("scene.glb");
    // Exits 0 after "exporting" only one of the two outputs.
    let blender = fx.fake_blender(&format!(
        "{}\necho 'Traceback (most recent call last):'",
        touch_all(&[&gltf])
    ));
    let request = fx.request(blender, &[("gltf", "scene.gltf"), ("glb", "scene.glb")]);

    let report = fx.launcher().run(&request).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.verdict.exit, ExitCheck::Clean);
    assert_eq!(report.verdict.outputs, OutputCheck::Missing(vec![glb]));
    assert_eq!(report.exit_code(), 1);
    assert!(report.output.unwrap().contains("Traceback"));

    let ScratchState::Preserved(scratch) = report.scratch else {
        panic!("scratch directory should be preserved");
    };
    let artifact = TransferArtifact::read_from(&scratch.join(ARTIFACT_FILE_NAME)).unwrap();
    assert_eq!(artifact, TransferArtifact::from_request(&request));
}

#[test]
fn test_child_reads_identical_artifact() {
    let fx = Fixture::new();
    let glb = fx.out_dir().join("scene.glb");
    let copy = fx.path("seen.json");
    let blender = fx.fake_blender(&format!(
        "cp \"$RULES_BLENDER_ARGS_FILE\" '{}'\n{}",
        copy.display(),
        touch_all(&[&glb])
    ));
    let request = fx.request(blender, &[("glb", "scene.glb")]);

    let report = fx.launcher().run(&request).unwrap();
    assert!(report.is_success());

    let seen = TransferArtifact::read_from(&copy).unwrap();
    assert_eq!(seen, TransferArtifact::from_request(&request));
    assert_eq!(
        seen.arguments.get("export_extras"),
        Some(&serde_json_value(r#"{"keep": [1, 2.5, null]}"#))
    );
}

#[test]
fn test_inline_bridge_carries_argv() {
    let fx = Fixture::new();
    let glb = fx.out_dir().join("scene.glb");
    let seen = fx.path("sentinel.txt");
    let blender = fx.fake_blender(&format!(
        "printf '%s' \"$RULES_BLENDER_RUNNING_UNDER_PROCESS_WRAPPER\" > '{}'\n{}",
        seen.display(),
        touch_all(&[&glb])
    ));
    let request = fx.request(blender, &[("glb", "scene.glb")]);
    let launcher = Launcher::new(
        WrapperConfig::default()
            .temp_root(fx.scratch_root())
            .bridge_mode(BridgeMode::InlineArgv),
    );

    let report = launcher.run(&request).unwrap();
    assert!(report.is_success());

    let argv: Vec<String> = serde_json::from_str(&fs::read_to_string(&seen).unwrap()).unwrap();
    assert_eq!(argv, request.to_argv());
}

#[test]
fn test_spawn_failure_preserves_scratch() {
    let fx = Fixture::new();
    let request = fx.request(fx.path("no-such-blender"), &[("glb", "scene.glb")]);

    assert!(fx.launcher().run(&request).is_err());
    assert_eq!(fx.scratch_dirs().len(), 1);
}

fn serde_json_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap()
}
