mod common;

use assert_matches::assert_matches;

use reelsmith_core::activity_log::LogLevel;
use reelsmith_core::editor::{EditorEvent, GenerationStatus};
use reelsmith_studio::api::{StudioApi, StudioApiError, StudioBackend};

use common::{scene_bytes, spawn_service, Call};

#[tokio::test]
async fn status_ping_reports_ok() {
    let service = spawn_service().await;
    let status = service.api().status().await.unwrap();

    assert_eq!(status.status, "ok");
    assert_eq!(service.recorder.calls(), [Call::Status]);
}

#[tokio::test]
async fn generated_scene_is_appended_and_previewed() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("A circle morphing into a square").await;

    let state = session.state();
    assert_eq!(state.scenes().len(), 1);
    let scene = state.scenes().last().unwrap();
    assert_eq!(scene.label, "A circle morphing into a square");

    let blob = state.media().get(scene.media.as_ref().unwrap()).unwrap();
    assert_eq!(blob.data.as_ref(), scene_bytes(&scene.label).as_bytes());
    assert_eq!(blob.content_type, "video/mp4");
    assert_eq!(blob.file_name.as_deref(), Some("animation.mp4"));

    assert_eq!(state.preview().map(|p| p.scene_id), Some(scene.id));
    assert_eq!(state.generation(), &GenerationStatus::Idle);
    assert_eq!(state.log().latest().unwrap().level, LogLevel::Success);
    assert_eq!(
        service.recorder.calls(),
        [Call::Generate("A circle morphing into a square".into())]
    );
}

#[tokio::test]
async fn each_generation_gets_a_fresh_scene_id() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("same prompt").await;
    session.submit_prompt("same prompt").await;

    let ids: Vec<_> = session.state().scenes().iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(session.state().preview().unwrap().scene_id, ids[1]);
}

#[tokio::test]
async fn blank_prompt_never_reaches_the_service() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("   ").await;

    assert!(session.state().scenes().is_empty());
    assert_eq!(session.state().log().len(), 1);
    assert_eq!(session.state().log().latest().unwrap().level, LogLevel::Warning);
    assert!(service.recorder.calls().is_empty());
}

#[tokio::test]
async fn service_detail_is_surfaced_on_failure() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("please fail").await;

    let state = session.state();
    assert!(state.scenes().is_empty());
    assert!(state.preview().is_none());
    assert!(state.can_generate());
    let latest = state.log().latest().unwrap();
    assert_eq!(latest.level, LogLevel::Error);
    assert!(
        latest.message.contains("Manim rendering failed: please fail"),
        "{}",
        latest.message
    );
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let service = spawn_service().await;
    let err = service.api().generate_scene("opaque").await.unwrap_err();

    assert_matches!(err, StudioApiError::Service { status: 502, detail: None });
    assert_eq!(err.reason(), "Request failed with status 502");
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    let api = StudioApi::new("http://127.0.0.1:1");
    let err = api.generate_scene("anything").await.unwrap_err();

    assert_matches!(err, StudioApiError::Request(_));
    assert!(err.reason().starts_with("Could not reach the service"));
}

#[tokio::test]
async fn failed_generation_keeps_earlier_scenes() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("first").await;
    let first = session.state().scenes().last().unwrap().id;
    session.submit_prompt("then fail").await;

    assert_eq!(session.state().scenes().len(), 1);
    assert_eq!(session.state().preview().unwrap().scene_id, first);
}

#[tokio::test]
async fn previewing_an_older_scene_moves_the_hold() {
    let service = spawn_service().await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = service.session(dir.path());

    session.submit_prompt("one").await;
    session.submit_prompt("two").await;
    let scenes: Vec<_> = session.state().scenes().iter().cloned().collect();
    let (one, two) = (&scenes[0], &scenes[1]);

    session
        .handle(EditorEvent::PreviewScene { scene_id: one.id })
        .await;

    let media = session.state().media();
    assert_eq!(media.holders(one.media.as_ref().unwrap()), 2);
    assert_eq!(media.holders(two.media.as_ref().unwrap()), 1);
}
