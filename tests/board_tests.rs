//! Tests for the job board view-model.

mod common;

use common::{job, wait_until, RecordingView, TestProfile};
use jobboard::board::{BoardView, JobBoard, TOAST_DURATION};
use jobboard::local_cache::DEFAULT_ANNOUNCEMENT;
use jobboard::remote::{InitError, JobDocument, MemoryMirror, RemoteMirror};
use jobboard::sync::{SyncController, SyncState};
use std::sync::Arc;

#[tokio::test]
async fn test_open_job_counts_one_view_and_persists() {
    let profile = TestProfile::new();
    let tab_a = profile.open_tab();
    let tab_b = profile.open_tab();
    let view = RecordingView::new();
    let board = JobBoard::new(tab_a.cache.clone(), view.clone());
    tab_a
        .cache
        .set_jobs(&[job("a", "Accountant", 2), job("b", "Barista", 1)]);

    let target = board.find_job("b").unwrap();
    let updated = board.open_job(&target).await.unwrap();

    assert_eq!(updated.views, 1);
    assert_eq!(board.open_job_id(), Some("b".to_string()));
    assert_eq!(*view.details.lock().unwrap(), vec!["b".to_string()]);
    assert_eq!(view.last_render().unwrap()[1].views, 1);

    // Persisted for every tab of the profile
    let seen_by_b = tab_b.cache.get_jobs();
    assert_eq!(seen_by_b[1].views, 1);
    assert_eq!(seen_by_b[0].views, 0);
}

#[tokio::test]
async fn test_apply_counts_one_apply_on_the_open_job() {
    let profile = TestProfile::new();
    let tab = profile.open_tab();
    let view = RecordingView::new();
    let board = JobBoard::new(tab.cache.clone(), view.clone());
    tab.cache.set_jobs(&[job("a", "Accountant", 2)]);

    let target = board.find_job("a").unwrap();
    board.open_job(&target).await;
    let updated = board.apply_clicked().await.unwrap();

    assert_eq!(updated.applies, 1);
    assert_eq!(updated.views, 1);
    assert_eq!(tab.cache.get_jobs()[0].applies, 1);
}

#[tokio::test]
async fn test_opening_a_job_gone_from_the_cache() {
    let profile = TestProfile::new();
    let tab = profile.open_tab();
    let view = RecordingView::new();
    let board = JobBoard::new(tab.cache.clone(), view.clone());

    assert!(board.open_job(&job("ghost", "Ghost", 1)).await.is_none());
    // The detail view still opens
    assert_eq!(*view.details.lock().unwrap(), vec!["ghost".to_string()]);
    assert_eq!(view.render_count(), 0);
}

#[test]
fn test_refresh_without_stored_jobs_shows_default() {
    let profile = TestProfile::new();
    let tab = profile.open_tab();
    let view = RecordingView::new();
    let board = JobBoard::new(tab.cache.clone(), view.clone());

    let jobs = board.refresh();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "job_default_1");
    assert_eq!(view.last_render().unwrap()[0].excerpt, "Role: Finance Executive");
}

#[test]
fn test_show_announcement_falls_back_to_default() {
    let profile = TestProfile::new();
    let tab = profile.open_tab();
    let view = RecordingView::new();
    let board = JobBoard::new(tab.cache.clone(), view.clone());

    board.show_announcement();
    tab.cache.set_announcement("Walk-in at 10am");
    board.show_announcement();

    assert_eq!(
        view.toasts(),
        vec![
            (DEFAULT_ANNOUNCEMENT.to_string(), TOAST_DURATION),
            ("Walk-in at 10am".to_string(), TOAST_DURATION),
        ]
    );
}

async fn live_board(
    profile: &TestProfile,
    mirror: &Arc<MemoryMirror>,
    sync_counters: bool,
) -> (JobBoard, Arc<RecordingView>) {
    let tab = profile.open_tab();
    let view = RecordingView::new();
    let board_view: Arc<dyn BoardView> = view.clone();
    let remote: Arc<dyn RemoteMirror> = mirror.clone();
    let controller = SyncController::start(
        tab.cache.clone(),
        JobBoard::view_hooks(board_view.clone()),
        async move { Ok::<_, InitError>(remote) },
    );
    assert_eq!(controller.settled().await, SyncState::Live);
    let board = JobBoard::new(tab.cache, board_view).with_sync(controller, sync_counters);
    (board, view)
}

#[tokio::test]
async fn test_counters_stay_local_by_default() {
    let profile = TestProfile::new();
    let mirror = Arc::new(MemoryMirror::new());
    let document = JobDocument::from_record(&job("r", "Remote job", 5));
    mirror.set_job("r", &document).await.unwrap();
    let writes = mirror.write_count();

    let (board, view) = live_board(&profile, &mirror, false).await;
    wait_until("snapshot rendered", || view.render_count() >= 1).await;

    let target = board.find_job("r").unwrap();
    assert_eq!(board.open_job(&target).await.unwrap().views, 1);
    assert_eq!(mirror.write_count(), writes);
    assert_eq!(mirror.jobs()[0].document.views, Some(0));
}

#[tokio::test]
async fn test_sync_counters_writes_increments_to_the_remote() {
    let profile = TestProfile::new();
    let mirror = Arc::new(MemoryMirror::new());
    let document = JobDocument::from_record(&job("r", "Remote job", 5));
    mirror.set_job("r", &document).await.unwrap();

    let (board, view) = live_board(&profile, &mirror, true).await;
    wait_until("snapshot rendered", || view.render_count() >= 1).await;

    let target = board.find_job("r").unwrap();
    board.open_job(&target).await.unwrap();
    board.apply_clicked().await.unwrap();

    let remote = mirror.jobs();
    assert_eq!(remote[0].document.views, Some(1));
    assert_eq!(remote[0].document.applies, Some(1));
}

#[tokio::test]
async fn test_view_hooks_render_snapshots_as_cards() {
    let profile = TestProfile::new();
    let mirror = Arc::new(MemoryMirror::new());
    let document = JobDocument::from_record(&job("r", "Remote job\nHyderabad", 5));
    mirror.set_job("r", &document).await.unwrap();

    let (_board, view) = live_board(&profile, &mirror, false).await;
    wait_until("snapshot rendered", || view.render_count() >= 1).await;

    let cards = view.last_render().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Remote job");
    assert_eq!(cards[0].excerpt, "Hyderabad");
}
