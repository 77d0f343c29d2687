use log::info;
use rocket::{serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::{response::WriteResponse, user::UserSpec},
    db::user::User,
    store::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![create_user]
}

/// Create a user, or overwrite whatever was stored under the same email.
#[post("/create", data = "<spec>", format = "json")]
async fn create_user(spec: Json<UserSpec>, users: Coll<User>) -> Result<Json<WriteResponse<User>>> {
    let user = User::try_from(spec.0)?;
    info!("Creating user {}", user.email);
    users.set(&user.email, &user).await?;
    Ok(Json(WriteResponse::new("User created successfully", user)))
}
