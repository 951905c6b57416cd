//! `automator expand`

use anyhow::{Context as _, Result};
use automator_config::PlaybackFile;
use automator_sequencer::expand_actions;

use crate::cli::ExpandArgs;

pub fn run(args: &ExpandArgs) -> Result<()> {
    let playback = PlaybackFile::load(&args.file)
        .with_context(|| format!("loading {}", args.file.display()))?;

    for line in expanded_lines(&playback)? {
        println!("{line}");
    }
    Ok(())
}

/// One line per action after repeat expansion, numbered from 0
pub fn expanded_lines(playback: &PlaybackFile) -> Result<Vec<String>> {
    let actions = expand_actions(playback.to_actions()?);
    Ok(actions
        .iter()
        .enumerate()
        .map(|(index, action)| format!("{index:>4}  {:<8} {action}", action.kind()))
        .collect())
}
