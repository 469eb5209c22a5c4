use std::sync::Arc;

use anyhow::Result;
use mockito::Matcher;
use mockito::ServerGuard;
use serde_json::json;
use test_utils::article_response_fixture;
use test_utils::gif_fixture;
use tokio::sync::mpsc;

use super::ActionController;
use super::Outcome;
use crate::domain::models::Anchor;
use crate::domain::models::Artifact;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::FileUpload;
use crate::domain::models::MediaKind;
use crate::domain::models::ObjectUrlStore;
use crate::domain::models::Phase;
use crate::domain::models::ToolName;
use crate::domain::models::ToolRequest;
use crate::domain::models::ToolSpec;
use crate::domain::models::ValidationError;
use crate::domain::services::Validator;
use crate::infrastructure::backends::remote::RemoteBackend;

fn controller(url: &str, tool: ToolName) -> (ActionController, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let backend: BackendBox = Box::new(RemoteBackend::new(url, url));
    let controller = ActionController::new(
        ToolSpec::get(tool),
        "user_1",
        Arc::new(backend),
        Validator::default(),
        ObjectUrlStore::new(),
        tx,
    );

    return (controller, rx);
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    return events;
}

fn loading(events: &[Event]) -> Vec<bool> {
    return events
        .iter()
        .filter_map(|e| match e {
            Event::Loading(value) => return Some(*value),
            _ => return None,
        })
        .collect();
}

fn phases(events: &[Event]) -> Vec<Phase> {
    return events
        .iter()
        .filter_map(|e| match e {
            Event::PhaseChanged(phase) => return Some(*phase),
            _ => return None,
        })
        .collect();
}

async fn mock_credits(server: &mut ServerGuard, balance: i64) -> mockito::Mock {
    return server
        .mock("GET", "/plans/current")
        .match_query(Matcher::UrlEncoded("clerkId".into(), "user_1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "currentLimit": balance } }).to_string())
        .create_async()
        .await;
}

fn article_request() -> ToolRequest {
    return ToolRequest::new()
        .with_field("description", "AI in healthcare")
        .with_field("tone", "informative")
        .with_field("language", "English")
        .with_field("outputCount", "2");
}

#[tokio::test]
async fn it_generates_an_article() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = mock_credits(&mut server, 5).await;
    let article = server
        .mock("POST", "/response/article")
        .match_query(Matcher::UrlEncoded("clerkId".into(), "user_1".into()))
        .match_body(Matcher::Json(json!({
            "description": "AI in healthcare",
            "tone": "informative",
            "language": "English",
            "outputCount": 2
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(article_response_fixture())
        .expect(1)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let outcome = controller.run(article_request()).await?;

    credits.assert_async().await;
    article.assert_async().await;
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(controller.phase(), Phase::Succeeded);

    match controller.result() {
        Some(Artifact::Text(entries)) => assert_eq!(entries.len(), 2),
        _ => panic!("Expected a text result"),
    }

    let events = drain(&mut rx);
    assert_eq!(loading(&events), vec![true, false]);
    assert_eq!(
        phases(&events),
        vec![
            Phase::Validating,
            Phase::CheckingCredits,
            Phase::Submitting,
            Phase::Succeeded
        ]
    );
    assert!(events.contains(&Event::CreditsUpdated(5)));
    assert!(events.contains(&Event::ResultReady(ToolName::Article)));

    let loader = events
        .iter()
        .position(|e| return *e == Event::ScrollTo(Anchor::Loader));
    let results = events
        .iter()
        .position(|e| return *e == Event::ScrollTo(Anchor::Results));
    assert!(loader.is_some() && results.is_some() && loader < results);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_prohibited_input_without_network_calls() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = server
        .mock("GET", "/plans/current")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let article = server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let request = article_request().with_field("description", "How to MAKE A BOMB at home");
    let outcome = controller.run(request).await?;

    credits.assert_async().await;
    article.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Rejected(ValidationError::Prohibited(
            "What should the article be about?".to_string()
        ))
    );
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(controller.result().is_none());

    let events = drain(&mut rx);
    assert!(loading(&events).is_empty());
    assert!(events
        .iter()
        .any(|e| return matches!(e, Event::Notice(notice) if notice.is_error())));

    return Ok(());
}

#[tokio::test]
async fn it_rejects_fields_outside_the_tool_schema() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = server
        .mock("GET", "/plans/current")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let article = server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let request = article_request().with_field("notes", "how to make a bomb");
    let outcome = controller.run(request).await?;

    credits.assert_async().await;
    article.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Rejected(ValidationError::UnknownField("notes".to_string()))
    );
    assert_eq!(controller.phase(), Phase::Failed);
    assert!(loading(&drain(&mut rx)).is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_shows_the_paywall_when_credits_are_exhausted() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = mock_credits(&mut server, 0).await;
    let article = server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let outcome = controller.run(article_request()).await?;

    credits.assert_async().await;
    article.assert_async().await;
    assert_eq!(outcome, Outcome::Blocked(0));
    assert_eq!(controller.phase(), Phase::Blocked);

    let events = drain(&mut rx);
    assert!(events.contains(&Event::Paywall(0)));
    assert_eq!(loading(&events), vec![true, false]);

    return Ok(());
}

#[tokio::test]
async fn it_fails_closed_when_credits_cannot_be_fetched() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = server
        .mock("GET", "/plans/current")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let article = server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let outcome = controller.run(article_request()).await?;

    credits.assert_async().await;
    article.assert_async().await;
    assert_eq!(outcome, Outcome::Blocked(0));

    let events = drain(&mut rx);
    assert!(events.contains(&Event::Paywall(0)));
    assert!(events
        .iter()
        .any(|e| return matches!(e, Event::Notice(notice) if notice.is_error())));

    return Ok(());
}

#[tokio::test]
async fn it_clears_loading_once_when_the_tool_fails() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 3).await;
    server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Model is overloaded"}"#)
        .create_async()
        .await;

    let (mut controller, mut rx) = controller(&server.url(), ToolName::Article);
    let outcome = controller.run(article_request()).await?;

    assert_eq!(outcome, Outcome::Failed("Model is overloaded".to_string()));
    assert_eq!(controller.phase(), Phase::Failed);

    let events = drain(&mut rx);
    assert_eq!(loading(&events), vec![true, false]);
    assert!(events.contains(&Event::ScrollTo(Anchor::Results)));

    return Ok(());
}

#[tokio::test]
async fn it_keeps_the_previous_result_after_a_failure() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 3).await;
    let success = server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(article_response_fixture())
        .expect(1)
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::Article);
    controller.run(article_request()).await?;
    success.assert_async().await;
    success.remove_async().await;

    server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("not json")
        .create_async()
        .await;

    let outcome = controller.run(article_request()).await?;
    assert_eq!(
        outcome,
        Outcome::Failed("Something went wrong, please try again later.".to_string())
    );
    assert!(matches!(controller.result(), Some(Artifact::Text(entries)) if entries.len() == 2));

    return Ok(());
}

#[tokio::test]
async fn it_uses_direct_urls_for_background_removal() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 1).await;
    let removal = server
        .mock("POST", "/response/background-removal")
        .match_query(Matcher::UrlEncoded("clerkId".into(), "user_1".into()))
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "backgroundRemovedImageUrl": { "response": { "image_url": "https://x/y.png" } }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::BackgroundRemoval);
    let request =
        ToolRequest::new().with_file(FileUpload::new("cat.png", "image/png", vec![1, 2, 3]));
    let outcome = controller.run(request).await?;

    removal.assert_async().await;
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(
        controller.result(),
        Some(&Artifact::Remote {
            url: "https://x/y.png".to_string(),
            media: MediaKind::Image,
        })
    );
    assert_eq!(
        controller.result().and_then(|e| return e.source()),
        Some("https://x/y.png".to_string())
    );
    assert!(controller.store().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_stores_blob_results_behind_object_urls() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 2).await;
    server
        .mock("POST", "/response/gif-converter")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "image/gif")
        .with_body(gif_fixture())
        .expect(2)
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::GifConverter);
    let request = ToolRequest::new().with_file(FileUpload::new(
        "holiday-clip.mov",
        "video/quicktime",
        vec![0, 0, 0, 20],
    ));
    controller.run(request.clone()).await?;

    let first_url = match controller.result() {
        Some(Artifact::Binary {
            object_url,
            filename,
            media,
        }) => {
            assert_eq!(filename, "output.gif");
            assert_eq!(*media, MediaKind::Image);
            assert!(object_url.as_str().starts_with("blob:toolgate/"));
            assert_eq!(object_url.bytes().map(|e| return e.to_vec()), Some(gif_fixture()));
            assert_eq!(object_url.mime(), Some("image/gif".to_string()));
            object_url.to_string()
        }
        _ => panic!("Expected a binary result"),
    };
    assert_eq!(controller.store().len(), 1);

    // Regenerating replaces the blob instead of leaking the old one.
    controller.run(request).await?;
    assert_eq!(controller.store().len(), 1);
    assert!(controller.store().resolve(&first_url).is_none());

    controller.reset()?;
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.result().is_none());
    assert!(controller.store().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_rejects_uploads_with_the_wrong_type() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let credits = server
        .mock("GET", "/plans/current")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::GifConverter);
    let request =
        ToolRequest::new().with_file(FileUpload::new("notes.pdf", "application/pdf", vec![1]));
    let outcome = controller.run(request).await?;

    credits.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Rejected(ValidationError::UnsupportedFileType {
            mime: "application/pdf".to_string(),
            accepted: "video/*".to_string(),
        })
    );

    return Ok(());
}

#[tokio::test]
async fn it_explicitly_decreases_credits_for_transcription() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 4).await;
    server
        .mock("POST", "/response/audio-transcription")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"Hello from the meeting."}"#)
        .create_async()
        .await;
    let decrease = server
        .mock("POST", "/limits/decrease")
        .match_query(Matcher::UrlEncoded("clerkId".into(), "user_1".into()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::AudioTranscription);
    let request =
        ToolRequest::new().with_file(FileUpload::new("meeting.mp3", "audio/mpeg", vec![7, 7]));
    let outcome = controller.run(request).await?;

    decrease.assert_async().await;
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(
        controller.result(),
        Some(&Artifact::Text(vec!["Hello from the meeting.".to_string()]))
    );

    return Ok(());
}

#[tokio::test]
async fn it_does_not_decrease_credits_for_implicit_tools() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    mock_credits(&mut server, 4).await;
    server
        .mock("POST", "/response/article")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(article_response_fixture())
        .create_async()
        .await;
    let decrease = server
        .mock("POST", "/limits/decrease")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (mut controller, _rx) = controller(&server.url(), ToolName::Article);
    controller.run(article_request()).await?;

    decrease.assert_async().await;

    return Ok(());
}
