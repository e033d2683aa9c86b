use core_logic::{cancellable_sleep, RunController, RunState};
use std::time::Duration;

#[tokio::test]
async fn test_guard_released_when_task_ends() {
    let controller = RunController::new("swap");
    let guard = controller.try_start().expect("idle controller must start");

    let handle = tokio::spawn(async move {
        let _guard = guard;
        tokio::task::yield_now().await;
    });
    handle.await.unwrap();

    assert_eq!(controller.state(), RunState::Idle);
    assert!(controller.try_start().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stop_wakes_sleeping_run() {
    let controller = RunController::new("swap");
    let guard = controller.try_start().unwrap();
    let token = guard.token().clone();

    let sleeper = tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        let completed = cancellable_sleep(Duration::from_secs(50), &token).await;
        (completed, start.elapsed())
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(controller.request_stop());

    let (completed, elapsed) = sleeper.await.unwrap();
    assert!(!completed);
    assert!(elapsed < Duration::from_secs(50));
    assert_eq!(controller.state(), RunState::Cancelling);

    drop(guard);
    assert_eq!(controller.state(), RunState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_sleep_completes_without_stop() {
    let controller = RunController::new("faucet");
    let guard = controller.try_start().unwrap();

    let start = tokio::time::Instant::now();
    assert!(cancellable_sleep(Duration::from_secs(5), guard.token()).await);
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[test]
fn test_controllers_are_independent() {
    let swap = RunController::new("swap");
    let send = RunController::new("send");

    let swap_guard = swap.try_start().unwrap();
    let send_guard = send.try_start().expect("send must start while swap runs");
    assert!(send.is_running());
    assert!(swap.is_running());

    assert!(send.request_stop());
    assert_eq!(send.state(), RunState::Cancelling);
    assert_eq!(swap.state(), RunState::Running);
    assert!(!swap_guard.is_cancelled());

    drop(send_guard);
    assert!(!send.is_running());
    assert!(swap.is_running());
}
