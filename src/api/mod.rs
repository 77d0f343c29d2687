use rocket::Route;

mod question;
mod text;
mod user;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(question::routes());
    routes.extend(text::routes());
    routes.extend(user::routes());
    routes.extend(crate::cors::routes());
    routes
}
