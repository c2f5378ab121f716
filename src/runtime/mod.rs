use std::env;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::warn;

use crate::logging::init_logging;
use crate::mpris::{ControlCmd, spawn_mpris};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::player::{Player, RodioPlayer};

mod command;
mod event_loop;
mod mpris_sync;
mod settings;
mod startup;
mod view;

use command::parse_command;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    let _log_guard = init_logging(&settings.logging)?;
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));

    let (library, tracks) = startup::open_library(&dir, &settings)?;
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let player = Player::spawn(
        RodioPlayer::open_default,
        tracks,
        library.clone(),
        notifier,
        &settings,
    )?;

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = spawn_mpris(control_tx.clone());
    spawn_stdin_reader(control_tx);

    println!("{}", command::HELP);
    let mut state = event_loop::EventLoopState::default();
    let result = event_loop::run(&player, &library, &mpris, &control_rx, &mut state);

    player.shutdown();
    result.map_err(Into::into)
}

/// Feed stdin lines to the runtime. End of input quits.
fn spawn_stdin_reader(tx: Sender<ControlCmd>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_command(&line) {
                Ok(Some(cmd)) => {
                    if tx.send(cmd).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(msg) => eprintln!("{msg}"),
            }
        }
        let _ = tx.send(ControlCmd::Quit);
    });
}

#[cfg(test)]
mod tests;
