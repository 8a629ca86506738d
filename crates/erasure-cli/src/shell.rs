//! Interactive deletion form
//!
//! Terminal rendition of the delete-account page: credential prompts, the
//! confirmation dialog, countdown digits and the final banner.

use erasure_core::{AccountDeletionWorkflow, BannerTone, Credential, WorkflowSnapshot, WorkflowState};
use std::future::Future;
use std::io::{BufRead, Write};

const DIALOG_TITLE: &str = "Are you absolutely sure?";
const DIALOG_TEXT: &str = "This action cannot be undone. This will permanently delete your \
                           account and remove all your data from our servers.";

/// How a run of the form ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl Outcome {
    pub(crate) fn exit_code(self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::Failed => 1,
            Self::Cancelled => 130,
        }
    }
}

/// Answers supplied on the command line
#[derive(Debug, Clone, Default)]
pub(crate) struct FormInput {
    pub(crate) email: Option<String>,
    pub(crate) password_stdin: bool,
    pub(crate) assume_yes: bool,
}

pub(crate) struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }

    /// Drive one deletion attempt to an outcome
    ///
    /// `interrupt` resolves when the user asks to abort (Ctrl-C). It cancels
    /// a running countdown; once the sequence is in progress it is only
    /// acknowledged.
    pub(crate) async fn run<I>(
        &mut self,
        workflow: &AccountDeletionWorkflow,
        form: &FormInput,
        interrupt: I,
    ) -> anyhow::Result<Outcome>
    where
        I: Future<Output = ()>,
    {
        let credential = self.read_credential(form)?;
        if let WorkflowState::Failed(_) = workflow.submit(credential)? {
            self.render_banner(&workflow.snapshot())?;
            return Ok(Outcome::Failed);
        }

        self.render_dialog()?;
        if !form.assume_yes && !self.ask_confirmation()? {
            workflow.cancel()?;
            writeln!(self.output, "Deletion cancelled.")?;
            return Ok(Outcome::Cancelled);
        }

        let mut interrupt = std::pin::pin!(interrupt);
        let mut rx = workflow.subscribe();
        let mut acknowledged = false;

        let mut confirm = std::pin::pin!(workflow.confirm());
        loop {
            tokio::select! {
                biased;
                result = &mut confirm => {
                    result?;
                    break;
                }
                () = &mut interrupt, if !acknowledged => {
                    acknowledged = true;
                    self.render_in_progress()?;
                }
            }
        }
        let mut state = rx.borrow_and_update().state.clone();

        while let Some(seconds) = state.seconds_remaining() {
            writeln!(self.output, "Deleting in {seconds}... (Ctrl-C to cancel)")?;
            tokio::select! {
                changed = rx.changed() => {
                    changed?;
                    state = rx.borrow_and_update().state.clone();
                }
                () = &mut interrupt, if !acknowledged => {
                    match workflow.cancel() {
                        Ok(_) => {
                            writeln!(self.output, "Deletion cancelled.")?;
                            return Ok(Outcome::Cancelled);
                        }
                        Err(e) if e.is_rejected() => {
                            acknowledged = true;
                            self.render_in_progress()?;
                            state = workflow.state();
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        let snapshot = loop {
            tokio::select! {
                snapshot = workflow.wait_until_settled() => break snapshot,
                () = &mut interrupt, if !acknowledged => {
                    acknowledged = true;
                    self.render_in_progress()?;
                }
            }
        };

        self.render_banner(&snapshot)?;
        Ok(match snapshot.state {
            WorkflowState::Succeeded => Outcome::Succeeded,
            _ => Outcome::Failed,
        })
    }

    fn read_credential(&mut self, form: &FormInput) -> anyhow::Result<Credential> {
        let email = match &form.email {
            Some(email) => email.clone(),
            None => self.prompt("Email: ")?,
        };
        let password = if form.password_stdin {
            self.read_line()?
        } else {
            self.prompt("Password: ")?
        };
        Ok(Credential::new(email, password))
    }

    fn ask_confirmation(&mut self) -> anyhow::Result<bool> {
        let answer = self.prompt("Delete account? [y/N] ")?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn prompt(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        self.read_line()
    }

    fn read_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn render_dialog(&mut self) -> std::io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "! {DIALOG_TITLE}")?;
        writeln!(self.output, "  {DIALOG_TEXT}")?;
        Ok(())
    }

    fn render_in_progress(&mut self) -> std::io::Result<()> {
        writeln!(self.output, "Deletion is already in progress and can no longer be cancelled.")
    }

    fn render_banner(&mut self, snapshot: &WorkflowSnapshot) -> std::io::Result<()> {
        let Some(banner) = &snapshot.banner else {
            return Ok(());
        };
        let marker = match banner.tone {
            BannerTone::Success => "✓",
            BannerTone::Error => "✗",
        };
        writeln!(self.output, "{marker} {}: {}", banner.title, banner.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erasure_core::WorkflowConfig;
    use erasure_test_utils::{seeded_backends, workflow_with, DEMO_EMAIL, DEMO_PASSWORD};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::time::Duration;

    fn shell(input: &str) -> Shell<Cursor<Vec<u8>>, Vec<u8>> {
        Shell::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn printed(shell: Shell<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Succeeded.exit_code(), 0);
        assert_eq!(Outcome::Failed.exit_code(), 1);
        assert_eq!(Outcome::Cancelled.exit_code(), 130);
    }

    #[tokio::test]
    async fn prompts_then_deletes() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new(), &identity, &records);
        let mut shell = shell(&format!("{DEMO_EMAIL}\n{DEMO_PASSWORD}\ny\n"));

        let outcome = shell
            .run(&workflow, &FormInput::default(), std::future::pending())
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Succeeded);
        assert!(!identity.has_account(DEMO_EMAIL));
        let out = printed(shell);
        assert!(out.contains(DIALOG_TITLE));
        assert!(out.contains("permanently deleted"));
    }

    #[tokio::test]
    async fn declining_the_dialog_cancels() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new(), &identity, &records);
        let mut shell = shell(&format!("{DEMO_PASSWORD}\nn\n"));
        let form = FormInput {
            email: Some(DEMO_EMAIL.to_string()),
            ..FormInput::default()
        };

        let outcome = shell.run(&workflow, &form, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert_eq!(identity.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_password_fails_validation() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new(), &identity, &records);
        let mut shell = shell("\n");
        let form = FormInput {
            email: Some(DEMO_EMAIL.to_string()),
            password_stdin: true,
            assume_yes: true,
        };

        let outcome = shell.run(&workflow, &form, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(identity.call_count(), 0);
        assert!(printed(shell).contains("Please enter both email and password."));
    }

    #[tokio::test]
    async fn wrong_password_prints_error_banner() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new(), &identity, &records);
        let mut shell = shell("wrong\n");
        let form = FormInput {
            email: Some(DEMO_EMAIL.to_string()),
            password_stdin: true,
            assume_yes: true,
        };

        let outcome = shell.run(&workflow, &form, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert!(printed(shell).contains("✗ Incorrect Password"));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_digits_are_rendered() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new().with_countdown(3), &identity, &records);
        let mut shell = shell(&format!("{DEMO_PASSWORD}\n"));
        let form = FormInput {
            email: Some(DEMO_EMAIL.to_string()),
            password_stdin: true,
            assume_yes: true,
        };

        let outcome = shell.run(&workflow, &form, std::future::pending()).await.unwrap();

        assert_eq!(outcome, Outcome::Succeeded);
        let out = printed(shell);
        for seconds in 1..=3 {
            assert!(out.contains(&format!("Deleting in {seconds}...")));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_during_countdown_cancels() {
        let (identity, records) = seeded_backends();
        let workflow = workflow_with(WorkflowConfig::new().with_countdown(5), &identity, &records);
        let mut shell = shell(&format!("{DEMO_PASSWORD}\n"));
        let form = FormInput {
            email: Some(DEMO_EMAIL.to_string()),
            password_stdin: true,
            assume_yes: true,
        };

        let outcome = shell
            .run(&workflow, &form, tokio::time::sleep(Duration::from_millis(2500)))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert_eq!(identity.call_count(), 0);
        assert_eq!(records.call_count(), 0);
    }
}
