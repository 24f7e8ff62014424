#[macro_use]
extern crate rocket;

use lr_resolver::{Config, Resolver};
use rocket::{
    fairing::AdHoc,
    figment::Figment,
    http::Status,
    request::Request,
    serde::json::{Json, Value},
    Build, Rocket, State,
};
use serde::Deserialize;

mod error;
mod result;

use error::ErrorBody;

#[derive(Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    resolver: Config,
}

#[derive(Clone, Debug, Deserialize)]
struct ExpandRequest {
    urls: Vec<String>,
}

#[post("/api/expand", data = "<body>")]
async fn expand(
    body: Json<Value>,
    resolver: &State<Resolver>,
) -> Result<Json<result::ExpandResponse>, error::Error> {
    let request = serde_json::from_value::<ExpandRequest>(body.into_inner()).map_err(|error| {
        log::warn!("Invalid expansion request: {}", error);
        error::Error::InvalidInput
    })?;

    let results = resolver.resolve_all(request.urls).await;

    Ok(Json(results.into()))
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<ErrorBody>) {
    let message = if status.code >= 500 {
        "Internal Server Error"
    } else {
        status.reason().unwrap_or("Request error")
    };

    (status, Json(ErrorBody::new(message)))
}

fn cors() -> rocket_cors::CorsOptions {
    rocket_cors::CorsOptions::default()
        .allowed_origins(rocket_cors::AllowedOrigins::all())
        .allowed_methods(
            vec![rocket::http::Method::Get, rocket::http::Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
}

fn build(figment: Figment) -> Rocket<Build> {
    let rocket = rocket::custom(figment)
        .attach(AdHoc::config::<AppConfig>())
        .attach(AdHoc::try_on_ignite("Resolver", |rocket| async {
            match init_resolver(&rocket) {
                Ok(resolver) => Ok(rocket.manage(resolver)),
                Err(error) => {
                    log::error!("{:?}", error);
                    Err(rocket)
                }
            }
        }))
        .register("/", catchers![default_catcher])
        .mount("/", routes![expand]);

    match cors().to_cors() {
        Ok(cors) => rocket.attach(cors),
        Err(error) => {
            log::error!("Invalid CORS options: {:?}", error);
            rocket
        }
    }
}

#[launch]
fn rocket() -> _ {
    build(rocket::Config::figment())
}

fn init_resolver(rocket: &Rocket<Build>) -> Result<Resolver, error::InitError> {
    let config = rocket
        .state::<AppConfig>()
        .ok_or(error::InitError::MissingConfig)?;

    log::info!(
        "Resolving with timeout {:?} and concurrency {}",
        config.resolver.timeout,
        config.resolver.concurrency
    );

    Ok(Resolver::new(config.resolver.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::{ContentType, StatusClass};
    use rocket::local::asynchronous::Client;
    use serde_json::json;

    async fn client() -> Client {
        let figment = rocket::Config::figment()
            .merge(("resolver.system_proxy", false))
            .merge(("resolver.timeout_ms", 2000));

        Client::tracked(build(figment)).await.unwrap()
    }

    async fn post(client: &Client, body: &str) -> (Status, Value) {
        let response = client
            .post("/api/expand")
            .header(ContentType::JSON)
            .body(body)
            .dispatch()
            .await;
        let status = response.status();

        (status, response.into_json::<Value>().await.unwrap())
    }

    #[rocket::async_test]
    async fn missing_urls() {
        let client = client().await;
        let (status, body) = post(&client, r#"{"links": ["https://lnkd.in/abc123"]}"#).await;

        assert_eq!(status, Status::BadRequest);
        assert_eq!(
            body,
            json!({ "error": "Invalid input. Expected \"urls\" array." })
        );
    }

    #[rocket::async_test]
    async fn urls_not_an_array() {
        let client = client().await;
        let (status, _) = post(&client, r#"{"urls": "https://lnkd.in/abc123"}"#).await;

        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn non_string_url() {
        let client = client().await;
        let (status, _) = post(&client, r#"{"urls": ["https://lnkd.in/abc123", 42]}"#).await;

        assert_eq!(status, Status::BadRequest);
    }

    #[rocket::async_test]
    async fn malformed_json() {
        let client = client().await;
        let response = client
            .post("/api/expand")
            .header(ContentType::JSON)
            .body("{\"urls\": [")
            .dispatch()
            .await;

        assert_eq!(response.status().class(), StatusClass::ClientError);
    }

    #[rocket::async_test]
    async fn empty_batch() {
        let client = client().await;
        let (status, body) = post(&client, r#"{"urls": []}"#).await;

        assert_eq!(status, Status::Ok);
        assert_eq!(body, json!({ "results": [] }));
    }

    #[rocket::async_test]
    async fn failures_are_reported_per_url() {
        let client = client().await;
        let (status, body) = post(
            &client,
            r#"{"urls": ["http://127.0.0.1:1/abc123", "http://127.0.0.1:1/abc123", "not a url"]}"#,
        )
        .await;

        assert_eq!(status, Status::Ok);

        let mut results = body["results"].as_array().unwrap().clone();
        results.sort_by_key(|result| result["original"].as_str().unwrap().to_string());

        assert_eq!(
            results,
            vec![
                json!({
                    "original": "http://127.0.0.1:1/abc123",
                    "expanded": "http://127.0.0.1:1/abc123",
                    "error": "Failed to expand"
                }),
                json!({
                    "original": "not a url",
                    "expanded": "not a url",
                    "error": "Failed to expand"
                }),
            ]
        );
    }
}
