use log::{debug, error, info};
use rocket::{serde::json::Json, tokio, Route};

use crate::logging::RequestId;
use crate::model::{
    api::{response::Message, text::TextSubmission},
    db::text::TextEntry,
    store::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![submit_text]
}

/// Acknowledge a text submission, then store it in the background.
///
/// The write is best-effort: the caller has already been answered by the
/// time it happens, and a failure only shows up in the logs.
#[post("/submit/text", data = "<submission>", format = "json")]
async fn submit_text(
    id: RequestId,
    submission: Json<TextSubmission>,
    texts: Coll<TextEntry>,
) -> Json<Message> {
    let text = submission.0.input_text;
    info!("req{id}: Received input: {text}");
    let message = Message::new(format!("Form data received successfully: {text}"));

    tokio::spawn(async move {
        match texts.add(&TextEntry { text }).await {
            Ok(entry) => debug!("req{id}: Stored text entry {entry}"),
            Err(e) => error!("req{id}: Failed to store text entry: {e}"),
        }
    });

    Json(message)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::json,
    };

    use crate::model::store::{client_for, BrokenStore};

    use super::*;

    #[backend_test]
    async fn submit_acknowledges_and_stores(client: Client, texts: Coll<TextEntry>) {
        let response = client
            .post(uri!(submit_text))
            .header(ContentType::JSON)
            .body(json!({ "inputText": "hello there" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let body: Message = response.into_json().await.unwrap();
        assert_eq!(
            body,
            Message::new("Form data received successfully: hello there")
        );

        // The write happens in the background, so give it a moment.
        let mut stored = Vec::new();
        for _ in 0..50 {
            stored = texts.all().await.unwrap();
            if !stored.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "hello there");
    }

    #[rocket::async_test]
    async fn submit_acknowledges_even_if_the_store_fails() {
        let client = client_for(BrokenStore).await;
        let response = client
            .post(uri!(submit_text))
            .header(ContentType::JSON)
            .body(json!({ "inputText": "lost" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let body: Message = response.into_json().await.unwrap();
        assert_eq!(body, Message::new("Form data received successfully: lost"));
    }

    #[backend_test]
    async fn submissions_are_appended(client: Client, texts: Coll<TextEntry>) {
        for _ in 0..2 {
            let response = client
                .post(uri!(submit_text))
                .header(ContentType::JSON)
                .body(json!({ "inputText": "same" }).to_string())
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status());
        }

        let mut stored = Vec::new();
        for _ in 0..50 {
            stored = texts.all().await.unwrap();
            if stored.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stored.len(), 2);
    }
}
