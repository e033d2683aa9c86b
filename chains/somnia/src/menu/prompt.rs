use crate::menu::{App, Flow, MainCommand, ParameterSource};
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

/// Terminal prompts via dialoguer.
#[derive(Default)]
pub struct DialoguerPrompt {
    theme: ColorfulTheme,
}

impl DialoguerPrompt {
    /// `Ok(None)` when the operator dismisses the list (Esc / q).
    pub fn select<T: ToString>(&self, title: &str, items: &[T]) -> Result<Option<usize>> {
        let choice = Select::with_theme(&self.theme)
            .with_prompt(title)
            .default(0)
            .items(items)
            .interact_opt()?;
        Ok(choice)
    }
}

impl ParameterSource for DialoguerPrompt {
    fn ask(&self, prompt: &str) -> Option<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Main menu loop. Returns when the operator picks Exit.
pub fn run(app: &App, prompt: &DialoguerPrompt) -> Result<()> {
    loop {
        println!("\n{}\n", app.wallet_panel());

        let labels: Vec<&str> = MainCommand::ALL.iter().map(|c| c.label()).collect();
        let Some(index) = prompt.select("Menu", &labels)? else {
            continue;
        };

        let flow = match app.handle_main(MainCommand::ALL[index]) {
            Flow::Open(MainCommand::AutoSwap) => submenu(
                prompt,
                "Somnia Auto Swap Menu",
                || app.swap_entries(),
                |command| app.handle_swap(command, prompt),
            )?,
            Flow::Open(MainCommand::ClaimFaucet) => submenu(
                prompt,
                "Claim Faucet Menu",
                || app.faucet_entries(),
                |command| app.handle_faucet(command),
            )?,
            Flow::Open(MainCommand::AutoSend) => submenu(
                prompt,
                "Auto Send Token Menu",
                || app.send_entries(),
                |command| app.handle_send(command, prompt),
            )?,
            other => other,
        };

        if flow == Flow::Exit {
            return Ok(());
        }
    }
}

/// Re-renders the entries after every command so labels track run state.
fn submenu<C: Copy>(
    prompt: &DialoguerPrompt,
    title: &str,
    entries: impl Fn() -> Vec<(C, String)>,
    handle: impl Fn(C) -> Flow,
) -> Result<Flow> {
    loop {
        let entries = entries();
        let labels: Vec<&str> = entries.iter().map(|(_, label)| label.as_str()).collect();
        let Some(index) = prompt.select(title, &labels)? else {
            return Ok(Flow::Back);
        };

        match handle(entries[index].0) {
            Flow::Stay => continue,
            Flow::Exit => return Ok(Flow::Exit),
            _ => return Ok(Flow::Back),
        }
    }
}
