mod common;

use common::{context, MockChain};
use core_logic::{LogBook, LogSink, RunState};
use ethers::types::{Address, U256};
use somnia_project::config::Token;
use somnia_project::menu::{
    App, FaucetCommand, Flow, MainCommand, ParameterSource, SendCommand, SwapCommand,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;

/// Answers prompts from a fixed script; `None` entries mean the operator cancelled.
struct Script {
    answers: Mutex<VecDeque<Option<String>>>,
}

impl Script {
    fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
        }
    }
}

impl ParameterSource for Script {
    fn ask(&self, _prompt: &str) -> Option<String> {
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

fn build_app(chain: Arc<MockChain>) -> (App, LogBook) {
    let (ctx, log) = context(chain, PathBuf::from("does-not-exist/randomaddress.txt"));
    (App::new(ctx, Handle::current()), log)
}

async fn wait_until(done: impl Fn() -> bool) {
    for _ in 0..200 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("workflow did not finish");
}

#[tokio::test]
async fn test_invalid_swap_count_does_not_start() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    let flow = app.handle_swap(SwapCommand::Start, &Script::new(&[Some("0")]));

    assert_eq!(flow, Flow::Stay);
    assert_eq!(log.messages(), vec!["Invalid swap count."]);
    tokio::task::yield_now().await;
    assert!(chain.submitted().is_empty());
}

#[tokio::test]
async fn test_cancelled_prompt_does_not_start() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    app.handle_send(SendCommand::RandomAddress, &Script::new(&[None]));

    assert_eq!(log.messages(), vec!["Input is invalid or was cancelled."]);
    assert_eq!(app.context().controllers.send.state(), RunState::Idle);
}

#[tokio::test]
async fn test_random_send_amount_out_of_range() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    app.handle_send(
        SendCommand::RandomAddress,
        &Script::new(&[Some("2"), Some("0.5")]),
    );

    assert_eq!(
        log.messages(),
        vec!["Amount must be between 0.0001 and 0.01 STT."]
    );
}

#[tokio::test]
async fn test_invalid_target_address() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    app.handle_send(SendCommand::ChosenAddress, &Script::new(&[Some("0xabc")]));

    assert_eq!(log.count_containing("Invalid address"), 1);
    assert!(chain.transfers().is_empty());
}

#[tokio::test]
async fn test_chosen_send_through_menu() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());
    let target = Address::repeat_byte(0x44);

    let answers = [Some(format!("{:?}", target)), Some("0.005".to_string())];
    let script = Script::new(&[answers[0].as_deref(), answers[1].as_deref()]);
    assert_eq!(app.handle_send(SendCommand::ChosenAddress, &script), Flow::Stay);

    let send = app.context().controllers.send.clone();
    wait_until(|| chain.native_queries() == 1 && !send.is_running()).await;

    assert_eq!(chain.transfers(), vec![(target, U256::exp10(15) * 5)]);
    assert_eq!(log.count_containing("Balances & wallet updated!"), 1);
}

#[tokio::test]
async fn test_stop_when_idle_logs_notice() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain);

    app.handle_swap(SwapCommand::Stop, &Script::new(&[]));
    app.handle_faucet(FaucetCommand::Stop);
    app.handle_send(SendCommand::Stop, &Script::new(&[]));

    assert_eq!(log.count_containing(App::NOTHING_RUNNING), 3);
}

#[tokio::test]
async fn test_stop_cancels_running_swap() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain);

    let guard = app.context().controllers.swap.try_start().unwrap();
    assert_eq!(app.swap_entries()[1].0, SwapCommand::Stop);

    app.handle_swap(SwapCommand::Stop, &Script::new(&[]));

    assert!(guard.is_cancelled());
    assert_eq!(app.context().controllers.swap.state(), RunState::Cancelling);
    assert_eq!(log.count_containing(App::NOTHING_RUNNING), 0);
}

#[tokio::test]
async fn test_faucet_stop_leaves_swap_running() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain);

    let swap = app.context().controllers.swap.try_start().unwrap();
    assert_eq!(app.faucet_entries()[2].0, FaucetCommand::Stop);

    app.handle_faucet(FaucetCommand::Stop);

    assert!(!swap.is_cancelled());
    assert_eq!(app.context().controllers.swap.state(), RunState::Running);
    assert_eq!(log.messages(), vec![App::SWAP_STOP_ELSEWHERE]);
}

#[tokio::test]
async fn test_faucet_stop_cancels_claim() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain);

    let swap = app.context().controllers.swap.try_start().unwrap();
    let claim = app.context().controllers.faucet.try_start().unwrap();

    app.handle_faucet(FaucetCommand::Stop);

    assert!(claim.is_cancelled());
    assert!(!swap.is_cancelled());
    assert_eq!(log.messages(), vec!["Stop requested for Claim Faucet."]);
}

#[tokio::test]
async fn test_faucet_claim_blocked_from_menu() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    let _swap = app.context().controllers.swap.try_start().unwrap();
    assert!(app.faucet_entries()[0].1.ends_with("(disabled)"));

    app.handle_faucet(FaucetCommand::Claim(Token::Ping));
    tokio::task::yield_now().await;

    assert_eq!(log.len(), 1);
    assert!(chain.mints().is_empty());
}

#[tokio::test]
async fn test_main_menu_navigation_and_clear() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain);

    assert_eq!(
        app.handle_main(MainCommand::AutoSwap),
        Flow::Open(MainCommand::AutoSwap)
    );
    assert_eq!(app.handle_main(MainCommand::Exit), Flow::Exit);
    assert_eq!(app.handle_swap(SwapCommand::Back, &Script::new(&[])), Flow::Back);

    log.append("something happened");
    assert_eq!(app.handle_main(MainCommand::ClearLogs), Flow::Stay);
    assert_eq!(log.messages(), vec![LogBook::CLEARED]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_from_menu_thread() {
    let chain = Arc::new(MockChain::new());
    let (app, log) = build_app(chain.clone());

    let flow = tokio::task::spawn_blocking(move || app.handle_main(MainCommand::Refresh))
        .await
        .unwrap();

    assert_eq!(flow, Flow::Stay);
    assert_eq!(chain.native_queries(), 1);
    assert_eq!(
        log.messages(),
        vec!["Balances & wallet updated!", "Refreshed"]
    );
}
