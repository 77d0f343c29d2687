use log::{debug, info};
use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        question::QuestionSpec,
        response::{Message, WriteResponse},
    },
    db::question::{NewQuestion, Question},
    store::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![get_questions, add_question, update_question, delete_question]
}

#[get("/questions/get")]
async fn get_questions(questions: Coll<NewQuestion>) -> Result<Json<Vec<Question>>> {
    let all = questions.all().await.map_err(Error::Listing)?;
    if all.is_empty() {
        debug!("No questions stored");
    }
    Ok(Json(all))
}

#[post("/questions/add", data = "<spec>", format = "json")]
async fn add_question(
    spec: Json<QuestionSpec>,
    questions: Coll<NewQuestion>,
) -> Result<Json<WriteResponse<Question>>> {
    debug!("Adding question {:?}", spec.0);
    let question = spec.0.into_question()?;

    // Check title uniqueness.
    let existing = questions.find_eq("title", question.title.as_str()).await?;
    if !existing.is_empty() {
        return Err(Error::Conflict);
    }

    let id = questions.add(&question).await?;
    info!("Created question {id}");
    Ok(Json(WriteResponse::new(
        "Question created successfully",
        Question::new(id, question),
    )))
}

#[put("/questions/update/<id>", data = "<spec>", format = "json")]
async fn update_question(
    id: &str,
    spec: Json<QuestionSpec>,
    questions: Coll<NewQuestion>,
) -> Result<Json<WriteResponse<Question>>> {
    info!("Updating question {id}");
    let question = spec.0.into_question()?;

    // Check title uniqueness, ignoring the question being updated.
    let clash = questions
        .find_eq("title", question.title.as_str())
        .await?
        .iter()
        .any(|existing| existing.id != id);
    if clash {
        return Err(Error::Conflict);
    }

    questions.merge(id, &question).await?;

    // Respond with the whole document, not just the fields that were sent.
    let written = match questions.get(id).await? {
        Some(written) => written,
        None => Question::new(id, question),
    };
    Ok(Json(WriteResponse::new("Question updated successfully", written)))
}

#[delete("/questions/delete/<id>")]
async fn delete_question(id: &str, questions: Coll<NewQuestion>) -> Result<Json<Message>> {
    info!("Deleting question {id}");
    questions.delete(id).await?;
    Ok(Json(Message::new("Question deleted successfully")))
}
