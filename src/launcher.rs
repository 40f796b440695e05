use std::io;
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info, warn};

use crate::config::URL_PLACEHOLDER;

/// Opens links outside the terminal. Implementations must return without
/// waiting on the opened program and must not report its outcome.
pub trait Launch {
    fn open(&self, target: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("nothing to open")]
    EmptyTarget,
    #[error("spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("open in browser: {0}")]
    Browser(#[source] io::Error),
}

#[derive(Debug, Clone)]
pub struct SystemLauncher {
    command: Vec<String>,
}

impl SystemLauncher {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl Launch for SystemLauncher {
    fn open(&self, target: &str) {
        let command = self.command.clone();
        let target = target.to_string();
        info!("opening {target}");
        let spawned = thread::Builder::new()
            .name("argot-launch".into())
            .spawn(move || {
                if let Err(err) = launch(&command, &target) {
                    warn!("failed to open {target:?}: {err}");
                }
            });
        if let Err(err) = spawned {
            warn!("failed to start launcher thread: {err}");
        }
    }
}

fn launch(command: &[String], target: &str) -> Result<(), LaunchError> {
    if target.trim().is_empty() {
        return Err(LaunchError::EmptyTarget);
    }

    let Some(mut cmd) = build_command(command, target) else {
        return webbrowser::open(target).map_err(LaunchError::Browser);
    };

    let program = command[0].clone();
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    let mut child = cmd
        .spawn()
        .map_err(|source| LaunchError::Spawn { program, source })?;
    match child.wait() {
        Ok(status) => debug!("launcher for {target} exited with {status}"),
        Err(err) => debug!("launcher for {target} could not be reaped: {err}"),
    }
    Ok(())
}

fn build_command(command: &[String], target: &str) -> Option<Command> {
    let (program, args) = command.split_first()?;
    let mut cmd = Command::new(program);
    cmd.args(launch_args(args, target));
    Some(cmd)
}

fn launch_args(args: &[String], target: &str) -> Vec<String> {
    let mut out: Vec<String> = args
        .iter()
        .map(|arg| arg.replace(URL_PLACEHOLDER, target))
        .collect();
    if !args.iter().any(|arg| arg.contains(URL_PLACEHOLDER)) {
        out.push(target.to_string());
    }
    out
}
