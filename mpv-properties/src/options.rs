//! Option names accepted at construction
//!
//! An option name is known when it is in [`ALL_OPTIONS`], is an alias, or names
//! a writable property. Flag-style options may also carry a `no-` prefix.

use crate::property::{attribute_to_name, lookup};

/// Options that only make sense at startup, or that have no property counterpart.
pub static ALL_OPTIONS: &[&str] = &[
    "audio-display",
    "config",
    "config-dir",
    "cursor-autohide-fs-only",
    "demuxer-max-bytes",
    "force-window",
    "fullscreen",
    "gpu-api",
    "gpu-context",
    "hwdec",
    "idle",
    "include",
    "input-conf",
    "input-default-bindings",
    "input-ipc-server",
    "input-terminal",
    "input-vo-keyboard",
    "keep-open",
    "load-scripts",
    "log-file",
    "msg-color",
    "msg-level",
    "msg-module",
    "osc",
    "profile",
    "quiet",
    "really-quiet",
    "resume-playback",
    "save-position-on-quit",
    "screenshot-directory",
    "script",
    "script-opts",
    "scripts",
    "sub-file-paths",
    "terminal",
    "watch-later-directory",
    "ytdl",
    "ytdl-format",
    "ytdl-raw-options",
];

/// Short spellings accepted in place of the full option name.
pub static OPTION_ALIASES: &[(&str, &str)] = &[("fs", "fullscreen")];

/// Resolve an alias to the canonical option name.
pub fn resolve_alias(name: &str) -> &str {
    OPTION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name)
}

/// Whether `name` (hyphenated) can be set as an option.
pub fn is_known_option(name: &str) -> bool {
    let name = resolve_alias(name);
    ALL_OPTIONS.contains(&name) || lookup(name).is_some_and(|spec| spec.access.writable())
}

/// Whether `flag` is a valid positional flag, including `no-` forms.
pub fn is_known_flag(flag: &str) -> bool {
    if is_known_option(flag) {
        return true;
    }
    flag.strip_prefix("no-").is_some_and(is_known_option)
}

/// Canonical option name for a keyword argument (`osd_level` becomes `osd-level`).
pub fn keyword_to_option(keyword: &str) -> String {
    attribute_to_name(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("fs", true)]
    #[case("no-video", true)]
    #[case("cursor-autohide-fs-only", true)]
    #[case("osd-level", true)]
    #[case("input-terminal", true)]
    #[case("no-osc", true)]
    #[case("this-option-does-not-exist", false)]
    #[case("no-", false)]
    #[case("core-idle", false)]
    fn test_flags(#[case] flag: &str, #[case] known: bool) {
        assert_eq!(is_known_flag(flag), known);
    }

    #[test]
    fn test_keyword_names() {
        assert_eq!(keyword_to_option("osd_level"), "osd-level");
        assert!(is_known_option(&keyword_to_option("loop")));
        assert!(!is_known_option("duration"));
    }
}
