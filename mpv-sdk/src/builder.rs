//! Player construction
//!
//! Every flag and option name is checked against the option table before the
//! native handle exists, so a typo never allocates anything. After that the
//! order is fixed: create the handle, apply options, initialize, install the
//! log handler, start the event loop. Any failure past creation destroys the
//! handle again.

use std::sync::Arc;

use mpv_abi::{NativeClient, NativeResult};
use mpv_event_manager::{EventLoopConfig, EventManager, LogHandle};
use mpv_properties::{is_known_flag, is_known_option, keyword_to_option, Value};

use crate::error::{Result, SdkError};
use crate::player::Mpv;

/// Builder for [`Mpv`]
///
/// # Example
///
/// ```rust,ignore
/// use mpv_sdk::MpvBuilder;
///
/// let mpv = MpvBuilder::new()
///     .with_flags(["no-video", "fs"])
///     .with_option("osd_level", 0)
///     .with_option("loop", "inf")
///     .with_log_handler(mpv_sdk::logging::tracing_log_handler())
///     .build()?;
/// ```
#[derive(Clone)]
pub struct MpvBuilder {
    flags: Vec<String>,
    options: Vec<(String, Value)>,
    log_handler: Option<LogHandle>,
    start_event_thread: bool,
    event_loop_config: EventLoopConfig,
}

impl Default for MpvBuilder {
    fn default() -> Self {
        Self {
            flags: Vec::new(),
            options: Vec::new(),
            log_handler: None,
            start_event_thread: true,
            event_loop_config: EventLoopConfig::default(),
        }
    }
}

impl MpvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a boolean option (`"fs"`), or disable one with `no-` (`"no-video"`).
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Set an option by keyword (`osd_level`) or hyphenated name (`osd-level`).
    pub fn with_option(mut self, keyword: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.push((keyword.into(), value.into()));
        self
    }

    /// Receive the player's log lines.
    pub fn with_log_handler(mut self, handler: LogHandle) -> Self {
        self.log_handler = Some(handler);
        self
    }

    /// Whether to start the event loop thread (default: true).
    ///
    /// Without it, events are only delivered through
    /// [`Mpv::dispatch_pending`] or while blocked in a wait.
    pub fn with_event_thread(mut self, start: bool) -> Self {
        self.start_event_thread = start;
        self
    }

    pub fn with_event_loop_config(mut self, config: EventLoopConfig) -> Self {
        self.event_loop_config = config;
        self
    }

    /// Check every flag and option name without touching the native layer.
    pub fn validate(&self) -> Result<()> {
        if let Some(flag) = self.flags.iter().find(|flag| !is_known_flag(flag)) {
            return Err(SdkError::UnknownOption(flag.clone()));
        }
        if let Some((keyword, _)) = self
            .options
            .iter()
            .find(|(keyword, _)| !is_known_option(&keyword_to_option(keyword)))
        {
            return Err(SdkError::UnknownOption(keyword.clone()));
        }
        self.event_loop_config.validate()?;
        Ok(())
    }

    /// Build with the native client produced by `factory`.
    ///
    /// `factory` is only called once validation has passed.
    pub fn build_with<F>(self, factory: F) -> Result<Mpv>
    where
        F: FnOnce() -> NativeResult<Arc<dyn NativeClient>>,
    {
        self.validate()?;
        let client = factory().map_err(|code| code.into_error(["create"]))?;
        tracing::debug!("Created native player handle");

        match self.configure(Arc::clone(&client)) {
            Ok(mpv) => Ok(mpv),
            Err(err) => {
                tracing::warn!(error = %err, "Player construction failed, destroying handle");
                client.terminate_destroy();
                Err(err)
            }
        }
    }

    /// Build on the system libmpv.
    #[cfg(feature = "libmpv")]
    pub fn build(self) -> Result<Mpv> {
        self.build_with(|| {
            mpv_abi::LibMpv::create().map(|mpv| Arc::new(mpv) as Arc<dyn NativeClient>)
        })
    }

    fn configure(self, client: Arc<dyn NativeClient>) -> Result<Mpv> {
        set_option(client.as_ref(), "audio-display", "no")?;
        for flag in &self.flags {
            set_option(client.as_ref(), flag, "")?;
        }
        for (keyword, value) in &self.options {
            set_option(
                client.as_ref(),
                &keyword_to_option(keyword),
                &value.to_option_string(),
            )?;
        }
        client
            .initialize()
            .map_err(|code| code.into_error(["initialize"]))?;

        let events = EventManager::new(Arc::clone(&client), self.event_loop_config)?;
        if let Some(handler) = self.log_handler {
            events.set_log_handler(Some(handler))?;
        }
        if self.start_event_thread {
            events.start()?;
        }

        tracing::info!(
            event_thread = self.start_event_thread,
            "Player initialized"
        );
        Ok(Mpv::from_parts(client, Arc::new(events)))
    }
}

fn set_option(client: &dyn NativeClient, name: &str, value: &str) -> Result<()> {
    match client.set_option_string(name, value) {
        Ok(()) => Ok(()),
        Err(code) => Ok(code.check([name, value])?),
    }
}

impl std::fmt::Debug for MpvBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpvBuilder")
            .field("flags", &self.flags)
            .field("options", &self.options)
            .field("log_handler", &self.log_handler.is_some())
            .field("start_event_thread", &self.start_event_thread)
            .field("event_loop_config", &self.event_loop_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("fs")]
    #[case::negated("no-video")]
    #[case::property("cursor-autohide-fs-only")]
    fn test_known_flags_validate(#[case] flag: &str) {
        assert!(MpvBuilder::new().with_flag(flag).validate().is_ok());
    }

    #[rstest]
    #[case::misspelled("fulscreen")]
    #[case::read_only("idle-active")]
    #[case::double_negated("no-no-video")]
    fn test_unknown_flags_fail(#[case] flag: &str) {
        let err = MpvBuilder::new().with_flag(flag).validate().unwrap_err();
        assert!(matches!(err, SdkError::UnknownOption(name) if name == flag));
    }

    #[test]
    fn test_options_accept_keywords() {
        let builder = MpvBuilder::new()
            .with_option("osd_level", 0)
            .with_option("loop", "inf")
            .with_option("cursor-autohide", "1000");
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_unknown_option_keyword_fails() {
        let err = MpvBuilder::new()
            .with_option("this_option_does_not_exist", true)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SdkError::UnknownOption(_)));
    }

    #[test]
    fn test_bad_event_loop_config_fails_validation() {
        let builder = MpvBuilder::new()
            .with_event_loop_config(EventLoopConfig::default().with_thread_name(""));
        assert!(matches!(builder.validate(), Err(SdkError::EventManager(_))));
    }
}
