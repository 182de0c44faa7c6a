//! Async driver loop.
//!
//! Owns the controller and the receiving end of the tokio scheduler, and
//! serializes everything the controller sees: timer expiries from the
//! scheduler and commands typed on stdin are handled one at a time, in
//! arrival order.

use std::{io::Write, str::FromStr};

use bb84_core::{
    Controller, ControllerAction, ControllerEvent, Environment, IgnoreReason, SessionConfig,
    SessionSnapshot, SessionState,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    error::CliError,
    render,
    scheduler::{TimerReceiver, TokioScheduler},
};

/// A line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin or resume the run.
    Start,
    /// Pause the run.
    Stop,
    /// Discard the session.
    Reset,
    /// Insert or remove the eavesdropper.
    Eavesdropper(bool),
    /// Print the table and summary.
    Status,
    /// Leave the loop.
    Quit,
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<_> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["start"] => Self::Start,
            ["stop"] => Self::Stop,
            ["reset"] => Self::Reset,
            ["eve", "on"] => Self::Eavesdropper(true),
            ["eve", "off"] => Self::Eavesdropper(false),
            ["status"] => Self::Status,
            ["quit" | "exit"] => Self::Quit,
            _ => return Err(CliError::UnknownCommand { input: line.trim().to_string() }),
        };
        Ok(command)
    }
}

/// Controller wired to a tokio scheduler.
pub struct Driver<E: Environment> {
    controller: Controller<E, TokioScheduler>,
    timers: TimerReceiver,
}

impl<E: Environment> Driver<E> {
    /// Driver for a fresh idle session.
    pub fn new(env: E, config: SessionConfig) -> Result<Self, CliError> {
        let (scheduler, timers) = TokioScheduler::new();
        let controller = Controller::new(env, scheduler, config)?;
        Ok(Self { controller, timers })
    }

    /// The controller being driven.
    pub fn controller(&self) -> &Controller<E, TokioScheduler> {
        &self.controller
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    /// Deliver a session command.
    ///
    /// `Status` and `Quit` are loop-level commands and leave the session
    /// untouched.
    pub fn apply(&mut self, command: Command) -> Result<Vec<ControllerAction>, CliError> {
        let event = match command {
            Command::Start => ControllerEvent::Start,
            Command::Stop => ControllerEvent::Stop,
            Command::Reset => ControllerEvent::Reset,
            Command::Eavesdropper(enabled) => ControllerEvent::SetEavesdropper { enabled },
            Command::Status | Command::Quit => return Ok(Vec::new()),
        };
        Ok(self.controller.handle(event)?)
    }

    /// Wait for the next timer expiry and deliver it.
    pub async fn next_tick(&mut self) -> Result<Vec<ControllerAction>, CliError> {
        let timer = self.timers.recv().await.ok_or(CliError::TimerChannelClosed)?;
        Ok(self.controller.handle(ControllerEvent::TimerFired(timer))?)
    }

    /// Run one session from start to completion, reporting each action.
    pub async fn run_session<W: Write>(&mut self, out: &mut W) -> Result<(), CliError> {
        for action in self.apply(Command::Start)? {
            render::write_action(out, &action)?;
        }

        while self.controller.state() == SessionState::Running {
            for action in self.next_tick().await? {
                render::write_action(out, &action)?;
            }
        }

        self.write_status(out)
    }

    /// Serve commands from `input` while delivering ticks.
    ///
    /// Returns on `quit`, or once input is exhausted and no run is in
    /// progress.
    pub async fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            if !input_open && self.controller.state() != SessionState::Running {
                return Ok(());
            }

            tokio::select! {
                actions = self.next_tick() => {
                    report(out, &actions?)?;
                    if self.controller.state() == SessionState::Complete {
                        self.write_status(out)?;
                    }
                },
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        input_open = false;
                        continue;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match self.handle_line(&line, out) {
                        Ok(true) => {},
                        Ok(false) => return Ok(()),
                        Err(e) if !e.is_fatal() => writeln!(out, "{e}")?,
                        Err(e) => return Err(e),
                    }
                },
            }
        }
    }

    /// Returns false when the loop should end.
    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool, CliError> {
        let command = line.parse::<Command>()?;
        tracing::debug!(?command, "command received");

        match command {
            Command::Quit => return Ok(false),
            Command::Status => self.write_status(out)?,
            command => report(out, &self.apply(command)?)?,
        }
        Ok(true)
    }

    fn write_status<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let snapshot = self.snapshot();
        render::write_table(out, &snapshot)?;
        render::write_summary(out, &snapshot)?;
        Ok(())
    }
}

/// Write actions for the interactive user.
///
/// Stale expiries are skipped: a sleep task can deliver its id just before a
/// stop or reset aborts it, and the controller already logs those.
fn report<W: Write>(out: &mut W, actions: &[ControllerAction]) -> Result<(), CliError> {
    for action in actions {
        if matches!(action, ControllerAction::Ignored { reason: IgnoreReason::StaleTimer }) {
            continue;
        }
        render::write_action(out, action)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use bb84_core::TRANSMISSIONS_PER_SESSION;

    use super::*;
    use crate::system_env::SeededEnv;

    fn driver(seed: u64) -> Driver<SeededEnv> {
        Driver::new(SeededEnv::with_seed(seed), SessionConfig::default()).unwrap()
    }

    #[test]
    fn commands_parse() {
        assert_eq!("start".parse::<Command>().unwrap(), Command::Start);
        assert_eq!("  eve   on ".parse::<Command>().unwrap(), Command::Eavesdropper(true));
        assert_eq!("eve off".parse::<Command>().unwrap(), Command::Eavesdropper(false));
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);

        let err = "launch".parse::<Command>().unwrap_err();
        assert!(matches!(err, CliError::UnknownCommand { ref input } if input == "launch"));
        assert!(!err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_session_takes_eight_intervals() {
        let mut driver = driver(1);
        let mut out = Vec::new();
        let started = tokio::time::Instant::now();

        driver.run_session(&mut out).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(8));
        let snapshot = driver.snapshot();
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.records.len(), TRANSMISSIONS_PER_SESSION);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("idle -> running"));
        assert!(text.contains("running -> complete"));
        assert!(text.contains("8/8"));
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_batch_output() {
        let mut first = Vec::new();
        let mut second = Vec::new();

        driver(99).run_session(&mut first).await.unwrap();
        driver(99).run_session(&mut second).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn interactive_quit_stops_before_ticks() {
        let mut driver = driver(2);
        let mut out = Vec::new();

        driver.run_interactive(&b"start\nstatus\nquit\n"[..], &mut out).await.unwrap();

        assert!(driver.snapshot().records.is_empty());
        assert_eq!(driver.controller().state(), SessionState::Running);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(no transmissions yet)"));
    }

    #[tokio::test(start_paused = true)]
    async fn interactive_drains_run_after_input_ends() {
        let mut driver = driver(3);
        let mut out = Vec::new();

        driver.run_interactive(&b"eve on\nstart\n"[..], &mut out).await.unwrap();

        let snapshot = driver.snapshot();
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.stats.intercepted, TRANSMISSIONS_PER_SESSION);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Eve basis"));
    }

    #[test]
    fn stale_expiries_are_not_shown() {
        let mut out = Vec::new();
        let actions = [
            ControllerAction::Ignored { reason: IgnoreReason::StaleTimer },
            ControllerAction::Ignored { reason: IgnoreReason::NotRunning },
        ];

        report(&mut out, &actions).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ignored: session is not running\n");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_commands_are_reported_and_skipped() {
        let mut driver = driver(4);
        let mut out = Vec::new();

        driver.run_interactive(&b"fly\nstop\n"[..], &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown command: \"fly\""));
        assert!(text.contains("ignored: session is not running"));
        assert_eq!(driver.controller().state(), SessionState::Idle);
    }
}
