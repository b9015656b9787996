//! `homeguard console` — the interactive keypad session.
//!
//! The console owns an `AccessController`, feeds it whatever the user types
//! and renders the outcomes. After every operation the controller's audit
//! events are flushed to the session's log file.
//!
//! Flow:
//!   1. Welcome banner
//!   2. Username setup (re-prompts until accepted)
//!   3. Password setup (re-prompts until accepted)
//!   4. Menu loop until "Quit" or end of input

use crate::access::{
    AccessController, AccessError, Clock, Confirmation, GuestOutcome, Outcome, OverrideOutcome,
    ResetGrant, ResetKind,
};
use crate::audit::AuditLogger;
use crate::cli::prompt::Prompter;
use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

const MENU: [&str; 9] = [
    "Unlock (enter your password)",
    "Owner override",
    "Set up guest access",
    "Guest entry",
    "Guest access report",
    "Reset username",
    "Reset password",
    "Status",
    "Quit",
];

/// Whether the menu loop should keep going.
enum Flow {
    Continue,
    Quit,
}

pub struct Console<C: Clock, R, W> {
    controller: AccessController<C>,
    prompter: Prompter<R, W>,
    logger: Option<AuditLogger>,
}

impl<C: Clock, R: BufRead, W: Write> Console<C, R, W> {
    pub fn new(
        controller: AccessController<C>,
        prompter: Prompter<R, W>,
        logger: Option<AuditLogger>,
    ) -> Self {
        Self {
            controller,
            prompter,
            logger,
        }
    }

    pub fn into_parts(self) -> (AccessController<C>, Prompter<R, W>) {
        (self.controller, self.prompter)
    }

    /// Run the whole session: setup, then the menu until quit or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome()?;
        self.flush_audit();

        if !self.setup_username()? || !self.setup_password()? {
            return Ok(());
        }

        loop {
            self.print_menu()?;
            let Some(choice) = self.prompter.choose(MENU.len())? else {
                break;
            };
            writeln!(self.prompter.out())?;

            let flow = match choice {
                0 => self.unlock()?,
                1 => self.owner_override()?,
                2 => self.setup_guest()?,
                3 => self.guest_entry()?,
                4 => self.guest_report()?,
                5 => self.reset_username()?,
                6 => self.reset_password()?,
                7 => self.show_status()?,
                _ => Flow::Quit,
            };
            self.flush_audit();

            if let Flow::Quit = flow {
                break;
            }
        }

        writeln!(self.prompter.out())?;
        writeln!(self.prompter.out(), "  Goodbye.")?;
        Ok(())
    }

    /// Hand pending audit events to the logger. A failed write is reported
    /// but does not end the session.
    fn flush_audit(&mut self) {
        let events = self.controller.drain_events();
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = logger.log_all(events) {
                tracing::error!("Failed to write audit log: {:#}", e);
            }
        }
    }

    fn print_welcome(&mut self) -> Result<()> {
        let out = self.prompter.out();
        writeln!(out)?;
        writeln!(out, "  {}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed())?;
        writeln!(
            out,
            "  {}  {}",
            "homeguard".bold(),
            "— Secure Homes Inc. security console".dimmed()
        )?;
        writeln!(out, "  {}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed())?;
        writeln!(out)?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        let out = self.prompter.out();
        writeln!(out)?;
        for (i, label) in MENU.iter().enumerate() {
            writeln!(out, "    {} {}", (i + 1).to_string().cyan().bold(), label)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn say_error(&mut self, error: &AccessError) -> Result<()> {
        let icon = if error.is_recoverable() {
            "✗".yellow()
        } else {
            "✗".red().bold()
        };
        writeln!(self.prompter.out(), "  {} {}", icon, error)?;
        Ok(())
    }

    // ── Setup ──

    fn setup_username(&mut self) -> Result<bool> {
        loop {
            let Some(input) = self.prompter.ask("Enter your username (empty for default):")? else {
                return Ok(false);
            };
            match self.controller.set_username(&input) {
                Ok(()) => {
                    let name = self.controller.account().display_name().to_string();
                    writeln!(self.prompter.out(), "  Welcome {}", name)?;
                    return Ok(true);
                }
                Err(e) => self.say_error(&e.into())?,
            }
        }
    }

    fn setup_password(&mut self) -> Result<bool> {
        loop {
            let Some(input) = self
                .prompter
                .ask("Enter a 4 digit numeric password (empty for default):")?
            else {
                return Ok(false);
            };
            match self.controller.set_password(&input) {
                Ok(()) => {
                    let name = self.controller.account().display_name().to_string();
                    writeln!(
                        self.prompter.out(),
                        "  {} Password set successfully, welcome {} to the Secure Homes Inc family.",
                        "✓".green().bold(),
                        name
                    )?;
                    self.flush_audit();
                    return Ok(true);
                }
                Err(e) => self.say_error(&e.into())?,
            }
        }
    }

    // ── Menu actions ──

    fn unlock(&mut self) -> Result<Flow> {
        if let Some(until) = self.controller.status().locked_until {
            writeln!(
                self.prompter.out(),
                "  {} Account is locked until {}. Please wait.",
                "🔒".to_string().red(),
                until.format("%Y-%m-%d %H:%M:%S")
            )?;
            return Ok(Flow::Continue);
        }

        let name = self.controller.account().display_name().to_string();
        let Some(input) = self.prompter.ask(&format!("{}, enter your password:", name))? else {
            return Ok(Flow::Quit);
        };

        match self.controller.verify(&input) {
            Ok(outcome) => self.render_outcome(outcome)?,
            Err(e) => self.say_error(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn render_outcome(&mut self, outcome: Outcome) -> Result<()> {
        let out = self.prompter.out();
        match outcome {
            Outcome::Granted => writeln!(out, "  {} Access granted", "✓".green().bold())?,
            Outcome::Denied { remaining_attempts } => writeln!(
                out,
                "  {} Incorrect password. Try again. You have {} attempts left",
                "✗".red(),
                remaining_attempts
            )?,
            Outcome::Locked { until } => writeln!(
                out,
                "  {} Multiple failed attempts detected! System locked until {}.",
                "🔒".to_string().red(),
                until.format("%Y-%m-%d %H:%M:%S")
            )?,
            Outcome::StillLocked { until } => writeln!(
                out,
                "  {} Account is locked until {}. Please wait.",
                "🔒".to_string().red(),
                until.format("%Y-%m-%d %H:%M:%S")
            )?,
        }
        Ok(())
    }

    /// Ask for the owner password and run the override. `Ok(None)` at end of input.
    fn authenticate_owner(&mut self) -> Result<Option<bool>> {
        let Some(input) = self.prompter.ask("Owner password:")? else {
            return Ok(None);
        };
        match self.controller.owner_override(&input) {
            Ok(OverrideOutcome::Granted) => Ok(Some(true)),
            Ok(OverrideOutcome::Denied) => {
                writeln!(self.prompter.out(), "  {} Owner override denied", "✗".red())?;
                Ok(Some(false))
            }
            Err(e) => {
                self.say_error(&e)?;
                Ok(Some(false))
            }
        }
    }

    fn owner_override(&mut self) -> Result<Flow> {
        match self.authenticate_owner()? {
            None => Ok(Flow::Quit),
            Some(true) => {
                writeln!(
                    self.prompter.out(),
                    "  {} Owner override accepted — access granted",
                    "✓".green().bold()
                )?;
                Ok(Flow::Continue)
            }
            Some(false) => Ok(Flow::Continue),
        }
    }

    fn setup_guest(&mut self) -> Result<Flow> {
        match self.authenticate_owner()? {
            None => return Ok(Flow::Quit),
            Some(false) => return Ok(Flow::Continue),
            Some(true) => {}
        }

        let max_days = self.controller.policy().guest_max_days;
        loop {
            let Some(days) = self
                .prompter
                .ask(&format!("Guest access for how many days (1-{})?", max_days))?
            else {
                return Ok(Flow::Quit);
            };
            let Ok(days) = days.trim().parse::<u32>() else {
                writeln!(
                    self.prompter.out(),
                    "  {} Enter a whole number of days",
                    "✗".yellow()
                )?;
                continue;
            };

            let Some(time) = self
                .prompter
                .ask("Time of day as HH:MM (empty to skip):")?
            else {
                return Ok(Flow::Quit);
            };
            let time = time.trim();
            let time = (!time.is_empty()).then_some(time);

            match self.controller.set_guest_access(days, time) {
                Ok(()) => {
                    let expiration = self.controller.guest().expiration;
                    if let Some(expiration) = expiration {
                        writeln!(
                            self.prompter.out(),
                            "  {} Guest access open until {}",
                            "✓".green().bold(),
                            expiration.format("%Y-%m-%d %H:%M")
                        )?;
                    }
                    return Ok(Flow::Continue);
                }
                Err(e) => self.say_error(&e)?,
            }
        }
    }

    fn guest_entry(&mut self) -> Result<Flow> {
        let Some(input) = self.prompter.ask("Guest password:")? else {
            return Ok(Flow::Quit);
        };
        let outcome = self.controller.verify_guest_access(&input);
        let out = self.prompter.out();
        match outcome {
            GuestOutcome::Granted => {
                writeln!(out, "  {} Guest access granted", "✓".green().bold())?
            }
            GuestOutcome::Denied { remaining_attempts } => writeln!(
                out,
                "  {} Incorrect guest password. {} attempts left",
                "✗".red(),
                remaining_attempts
            )?,
            GuestOutcome::Expired => writeln!(
                out,
                "  {} Guest access has expired or was never set up",
                "✗".red()
            )?,
            GuestOutcome::NightRestricted => writeln!(
                out,
                "  {} Guest access is not available at night",
                "✗".red()
            )?,
            GuestOutcome::TooManyAttempts => writeln!(
                out,
                "  {} Too many failed guest attempts",
                "✗".red()
            )?,
        }
        Ok(Flow::Continue)
    }

    fn guest_report(&mut self) -> Result<Flow> {
        let Some(input) = self.prompter.ask("Owner password:")? else {
            return Ok(Flow::Quit);
        };
        let report = match self.controller.guest_status_report(&input) {
            Ok(report) => report,
            Err(e) => {
                self.say_error(&e)?;
                return Ok(Flow::Continue);
            }
        };

        let out = self.prompter.out();
        if !report.configured {
            writeln!(out, "  {} Guest access has not been set up", "ℹ".blue())?;
            return Ok(Flow::Continue);
        }
        if let Some(expiration) = report.expiration {
            writeln!(out, "  Expires:  {}", expiration.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(ref time) = report.requested_time_of_day {
            writeln!(out, "  Requested time of day: {}", time)?;
        }
        writeln!(
            out,
            "  Attempts: {} used, {} remaining",
            report.attempts_used, report.attempts_remaining
        )?;
        let state = if report.active_now {
            "open".green()
        } else {
            "closed".red()
        };
        writeln!(out, "  Right now: {}", state)?;
        Ok(Flow::Continue)
    }

    fn reset_username(&mut self) -> Result<Flow> {
        let first = self
            .prompter
            .confirm("Are you sure you want to reset your username?")?;
        let (current, second) = if first {
            let Some(current) = self
                .prompter
                .ask("Enter your current password for verification:")?
            else {
                return Ok(Flow::Quit);
            };
            let second = self
                .prompter
                .confirm("This action cannot be undone. Are you sure you wish to proceed?")?;
            (current, second)
        } else {
            (String::new(), false)
        };

        match self
            .controller
            .reset_username(Confirmation::new(first, second), &current)
        {
            Ok(grant) => self.apply_reset(grant),
            Err(e) => {
                self.say_error(&e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn reset_password(&mut self) -> Result<Flow> {
        let first = self
            .prompter
            .confirm("Are you sure you want to reset your password?")?;
        let second = first
            && self
                .prompter
                .confirm("This action cannot be undone. Are you sure you wish to proceed?")?;

        match self
            .controller
            .reset_password(Confirmation::new(first, second))
        {
            Ok(grant) => self.apply_reset(grant),
            Err(e) => {
                self.say_error(&e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Prompt for the new value until the controller accepts it.
    fn apply_reset(&mut self, mut grant: ResetGrant) -> Result<Flow> {
        let kind = grant.kind();
        let question = match kind {
            ResetKind::Username => "Please set a new username:",
            ResetKind::Password => "Please set a new 4 digit password:",
        };
        loop {
            let Some(input) = self.prompter.ask(question)? else {
                return Ok(Flow::Quit);
            };
            let result = match kind {
                ResetKind::Username => self.controller.apply_username_reset(grant, &input),
                ResetKind::Password => self.controller.apply_password_reset(grant, &input),
            };
            match result {
                Ok(()) => {
                    writeln!(
                        self.prompter.out(),
                        "  {} {} updated",
                        "✓".green().bold(),
                        kind
                    )?;
                    return Ok(Flow::Continue);
                }
                Err(rejected) => {
                    self.say_error(&rejected.error)?;
                    if !rejected.can_retry() {
                        return Ok(Flow::Continue);
                    }
                    grant = rejected.into_grant();
                }
            }
        }
    }

    fn show_status(&mut self) -> Result<Flow> {
        let status = self.controller.status();
        let out = self.prompter.out();
        writeln!(
            out,
            "  User:     {}",
            status.username.as_deref().unwrap_or("-").bold()
        )?;
        writeln!(
            out,
            "  Password: {}",
            if status.password_set { "set" } else { "not set" }
        )?;
        writeln!(out, "  Failed attempts: {}", status.failed_attempts)?;
        match status.locked_until {
            Some(until) => writeln!(
                out,
                "  Lock:     {} until {}",
                "locked".red(),
                until.format("%Y-%m-%d %H:%M:%S")
            )?,
            None => writeln!(out, "  Lock:     {}", "unlocked".green())?,
        }
        match status.guest_expiration {
            Some(expiration) => writeln!(
                out,
                "  Guest:    until {}",
                expiration.format("%Y-%m-%d %H:%M")
            )?,
            None => writeln!(out, "  Guest:    not set up")?,
        }
        Ok(Flow::Continue)
    }
}
