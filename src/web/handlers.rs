use crate::error::InputError;
use crate::report::{ArtworkOrigin, ArtworkSource, ArtworkSubmission, UploadedImage};
use crate::web::error::{ApiError, ApiResult};
use crate::web::pages::{self, FormValues, PageView};
use crate::web::session::{Session, SessionId};
use crate::web::AppState;
use axum::extract::{Form, Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

pub const REPORT_FILE_NAME: &str = "artwork_style_brief.md";

fn page(session: &Session, form: FormValues, notices: Vec<String>, error: Option<String>) -> Html<String> {
    Html(pages::render_page(&PageView {
        has_model_key: session.credentials.has_model_key(),
        has_search_key: session.credentials.has_search_key(),
        notices,
        error,
        form,
        report: session.report(),
    }))
}

/// GET /
pub async fn index(State(state): State<AppState>, session: SessionId) -> Response {
    let html = state
        .sessions
        .read(session.id, |s| page(s, FormValues::default(), Vec::new(), None))
        .await;
    session.attach(html)
}

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub serp_api_key: Option<String>,
}

/// POST /credentials
pub async fn update_credentials(
    State(state): State<AppState>,
    session: SessionId,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let html = state
        .sessions
        .update(session.id, |s| {
            let mut notices = Vec::new();
            if s.credentials.update_model_key(form.openai_api_key) {
                notices.push("✅ OpenAI API key updated!".to_string());
            }
            if s.credentials.update_search_key(form.serp_api_key) {
                notices.push("✅ Serp API key updated!".to_string());
            }
            info!(session = %session.id, updated = notices.len(), "Credentials form submitted");
            page(s, FormValues::default(), notices, None)
        })
        .await;
    session.attach(html)
}

/// The artwork form as submitted. The image keeps its own validation result so that
/// credential problems are reported before image problems.
#[derive(Default)]
struct SubmittedForm {
    image: Option<Result<UploadedImage, InputError>>,
    values: FormValues,
}

async fn read_form(multipart: &mut Multipart) -> ApiResult<SubmittedForm> {
    let bad_request = |e: axum::extract::multipart::MultipartError| ApiError::BadRequest(e.to_string());
    let mut form = SubmittedForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                // Browsers send an empty part when no file was chosen
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.image = Some(UploadedImage::new(file_name, bytes.to_vec()));
            }
            "artist_name" => form.values.artist_name = field.text().await.map_err(bad_request)?,
            "artwork_title" => form.values.title = field.text().await.map_err(bad_request)?,
            "source" => {
                let label = field.text().await.map_err(bad_request)?;
                form.values.source = ArtworkSource::from_label(&label).unwrap_or_default();
            }
            "artwork_origin" => {
                let label = field.text().await.map_err(bad_request)?;
                form.values.origin = ArtworkOrigin::from_label(&label).unwrap_or_default();
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// POST /report
pub async fn generate_report(
    State(state): State<AppState>,
    session: SessionId,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let SubmittedForm { image, values } = read_form(&mut multipart).await?;

    let (image, image_error) = match image {
        Some(Ok(image)) => (Some(image), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };

    let submission = ArtworkSubmission {
        image,
        artist_name: Some(values.artist_name.clone()),
        title: Some(values.title.clone()),
        source: values.source,
        origin: values.origin,
    };

    let credentials = state.sessions.read(session.id, |s| s.credentials.clone()).await;
    let validated = submission.validate(&credentials).map_err(|err| match (err, image_error) {
        (InputError::MissingImage, Some(image_error)) => image_error,
        (err, _) => err,
    });

    let (profile, keys) = match validated {
        Ok(validated) => validated,
        Err(err) => {
            info!(session = %session.id, error = %err, "Report request rejected");
            let html = state
                .sessions
                .read(session.id, |s| page(s, values, Vec::new(), Some(err.to_string())))
                .await;
            return Ok(session.attach((StatusCode::UNPROCESSABLE_ENTITY, html)));
        }
    };

    info!(
        session = %session.id,
        file = %profile.image.file_name,
        bytes = profile.image.bytes.len(),
        "Generating artwork report"
    );

    // No session lock is held while the hosted services run
    let report = state.generator.generate(&profile, &keys).await?;

    let html = state
        .sessions
        .update(session.id, |s| {
            s.complete(profile.image, report);
            page(s, values, Vec::new(), None)
        })
        .await;

    Ok(session.attach(html))
}

/// GET /report/image
pub async fn report_image(State(state): State<AppState>, session: SessionId) -> ApiResult<Response> {
    let image = state
        .sessions
        .read(session.id, |s| s.image().map(|i| (i.format.mime_type(), i.bytes.clone())))
        .await
        .ok_or_else(|| ApiError::NotFound("No artwork has been uploaded yet".to_string()))?;

    Ok(([(CONTENT_TYPE, image.0)], image.1).into_response())
}

/// GET /report/download
pub async fn download_report(State(state): State<AppState>, session: SessionId) -> ApiResult<Response> {
    let report = state
        .sessions
        .read(session.id, |s| s.report().cloned())
        .await
        .ok_or_else(|| ApiError::NotFound("No report has been generated yet".to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", REPORT_FILE_NAME);
    Ok((
        [
            (CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        report.into_string(),
    )
        .into_response())
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "module": "art-connoisseur",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
