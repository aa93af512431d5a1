//! Canned flavor lines for command replies. Picked at random so the bot
//! does not sound like a log file.

use rand::seq::SliceRandom;

const PLAY: &[&str] = &[
    "Now playing: {}! Enjoy the vibes!",
    "Spinning up {} ~ hope it makes you smile!",
    "Here comes {} ~ let's jam!",
];

const QUEUED: &[&str] = &[
    "Added {} to the queue!",
    "{} is queued up and waiting its turn.",
    "Got it ~ {} joins the line.",
];

const RESOLVE_FAILED: &[&str] = &[
    "Couldn't play {}, moving on~",
    "No luck with {}, trying the next one.",
];

const PAUSE: &[&str] = &[
    "Paused ~ let's take a break!",
    "Holding the music for you.",
];

const RESUME: &[&str] = &[
    "Back to jamming ~ let's go!",
    "Unpaused and playing again!",
];

const SKIP: &[&str] = &[
    "Skipping to the next one!",
    "Whoosh ~ that song's gone, here comes the next!",
];

const STOP: &[&str] = &[
    "Stopping now ~ it was fun while it lasted!",
    "Okay! No more tunes for now~",
];

const CLEAR: &[&str] = &["Queue cleared!", "Wiped the queue clean."];

const NOT_IN_VOICE: &[&str] = &[
    "Please hop into a voice channel first!",
    "I can't play to an empty headset ~ join a voice channel!",
];

fn pick(lines: &'static [&'static str]) -> &'static str {
    lines.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}

pub fn play_started(title: &str) -> String {
    pick(PLAY).replace("{}", title)
}

pub fn queued(label: &str) -> String {
    pick(QUEUED).replace("{}", label)
}

pub fn resolve_failed(label: &str) -> String {
    pick(RESOLVE_FAILED).replace("{}", label)
}

/// Single fixed line so front-ends (and tests) can recognize it.
pub fn queue_exhausted() -> String {
    "Too many failures in a row, clearing the queue.".to_string()
}

pub fn paused() -> String {
    pick(PAUSE).to_string()
}

pub fn resumed() -> String {
    pick(RESUME).to_string()
}

pub fn skipped() -> String {
    pick(SKIP).to_string()
}

pub fn stopped() -> String {
    pick(STOP).to_string()
}

pub fn cleared() -> String {
    pick(CLEAR).to_string()
}

pub fn not_in_voice() -> String {
    pick(NOT_IN_VOICE).to_string()
}

/// Fixed lines, like [`queue_exhausted`], so the state change is unambiguous.
pub fn auto_advance(enabled: bool) -> String {
    if enabled {
        "Auto-advance is on ~ the queue rolls on by itself."
    } else {
        "Auto-advance is off ~ I'll hold after the current track."
    }
    .to_string()
}
