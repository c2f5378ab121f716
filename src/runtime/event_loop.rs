use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::Result;
use crate::library::LibraryBackend;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{Player, PlayerCmd};
use crate::runtime::command::HELP;
use crate::runtime::mpris_sync::{MprisKey, update_mpris};
use crate::runtime::view;

/// How long the loop waits for a command before re-syncing MPRIS.
const SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Last snapshot emitted to MPRIS.
    pub last_mpris: Option<MprisKey>,
}

/// What a control command asks of the player thread, if anything.
pub fn player_cmd(cmd: &ControlCmd) -> Option<PlayerCmd> {
    Some(match cmd {
        ControlCmd::Play => PlayerCmd::Resume,
        ControlCmd::Pause => PlayerCmd::Pause,
        ControlCmd::PlayPause => PlayerCmd::TogglePause,
        ControlCmd::Stop => PlayerCmd::Stop,
        ControlCmd::Next => PlayerCmd::Next,
        ControlCmd::Prev => PlayerCmd::Prev,
        ControlCmd::PlayIndex(i) => PlayerCmd::PlayIndex(*i),
        ControlCmd::PlayId(id) => PlayerCmd::PlayId(id.clone()),
        ControlCmd::SeekBy(millis) => PlayerCmd::SeekBy(*millis),
        ControlCmd::SeekTo(pos) => PlayerCmd::SeekTo(*pos),
        ControlCmd::ToggleShuffle => PlayerCmd::ToggleShuffle,
        ControlCmd::Repeat(Some(mode)) => PlayerCmd::SetRepeat(*mode),
        ControlCmd::Repeat(None) => PlayerCmd::CycleRepeat,
        ControlCmd::ToggleFavorite => PlayerCmd::ToggleFavorite,
        ControlCmd::Quit
        | ControlCmd::Stats(_)
        | ControlCmd::List
        | ControlCmd::Status
        | ControlCmd::Help => return None,
    })
}

/// Main runtime loop: forwards commands to the player, answers queries and
/// keeps MPRIS in sync. Returns when shutdown is requested.
pub fn run(
    player: &Player,
    library: &LibraryBackend,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        match control_rx.recv_timeout(SYNC_INTERVAL) {
            Ok(cmd) => {
                if handle_control_cmd(cmd, player, library)? {
                    info!("quit requested");
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("all command sources closed");
                return Ok(());
            }
        }

        // Playback also changes on its own (auto-advance, failures).
        let snapshot = player.snapshot();
        let key = MprisKey::of(&snapshot);
        if state.last_mpris != Some(key) {
            update_mpris(mpris, &snapshot);
            state.last_mpris = Some(key);
        }
    }
}

fn handle_control_cmd(cmd: ControlCmd, player: &Player, library: &LibraryBackend) -> Result<bool> {
    debug!(?cmd, "control command");
    if let Some(pc) = player_cmd(&cmd) {
        player.send(pc)?;
        return Ok(false);
    }

    match cmd {
        ControlCmd::Quit => return Ok(true),
        ControlCmd::Status => println!("{}", view::format_status(&player.snapshot())),
        ControlCmd::List => {
            let current = player.snapshot().index;
            println!("{}", view::format_queue(&library.tracks()?, current));
        }
        ControlCmd::Stats(artist) => match library.artist_stats(&artist) {
            Ok(stats) => println!("{}", view::format_stats(&stats)),
            Err(e) => println!("{e}"),
        },
        ControlCmd::Help => println!("{HELP}"),
        _ => {}
    }
    Ok(false)
}
