//! Picture endpoints: listings, detail, upload, likes, tags and comments.

use std::path::{Path, PathBuf};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpRequest, HttpResponse, Responder, Scope, delete, get, post, web};
use tracing::{info, warn};

use sharegrid_api::response::RestResult;
use sharegrid_common::SharegridError;

use crate::model::{
    CommentRequest, CommentView, LikeResponse, PictureDetail, PictureSummary, TagRequest,
};
use crate::state::AppState;

use super::{authenticated_user, error_envelope};

#[derive(Debug, MultipartForm)]
struct UploadForm {
    title: Text<String>,
    visibility: Text<String>,
    file: TempFile,
}

/// Strip any path components from a client-supplied file name.
fn sanitize_file_name(name: Option<&str>) -> String {
    let name = name.unwrap_or("upload.bin");
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("upload.bin");
    base.to_string()
}

/// Store the uploaded file under `<media_dir>/<username>/` and return the
/// path relative to the media directory.
fn store_upload(
    media_dir: &str,
    username: &str,
    file: &TempFile,
) -> Result<String, SharegridError> {
    let file_name = sanitize_file_name(file.file_name.as_deref());
    let user_dir = Path::new(media_dir).join(username);
    std::fs::create_dir_all(&user_dir)?;

    let destination: PathBuf = user_dir.join(&file_name);
    std::fs::copy(file.file.path(), &destination)?;

    Ok(format!("{}/{}", username, file_name))
}

#[get("/my")]
async fn my_pictures(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match authenticated_user(&req, &state) {
        Ok(user) => HttpResponse::Ok().json(RestResult::ok(state.store.pictures_of(user.user_id))),
        Err(e) => HttpResponse::Ok().json(error_envelope::<Vec<PictureSummary>>(&e)),
    }
}

/// Pictures of the caller's friends, private ones included.
#[get("/friends")]
async fn friends_pictures(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match authenticated_user(&req, &state) {
        Ok(user) => {
            HttpResponse::Ok().json(RestResult::ok(state.store.friends_pictures(user.user_id)))
        }
        Err(e) => HttpResponse::Ok().json(error_envelope::<Vec<PictureSummary>>(&e)),
    }
}

#[get("/public")]
async fn public_pictures(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = authenticated_user(&req, &state) {
        return HttpResponse::Ok().json(error_envelope::<Vec<PictureSummary>>(&e));
    }
    HttpResponse::Ok().json(RestResult::ok(state.store.public_pictures()))
}

/// Full picture view with like state, tags and comments.
#[get("/{id}")]
async fn detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.picture_detail(user.user_id, *path));

    match result {
        Ok(detail) => HttpResponse::Ok().json(RestResult::ok(detail)),
        Err(e) => HttpResponse::Ok().json(error_envelope::<PictureDetail>(&e)),
    }
}

/// Upload a picture, multipart: `title`, `visibility` (`public` or
/// `private`) and `file`.
#[post("")]
async fn upload(
    req: HttpRequest,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> impl Responder {
    let result = authenticated_user(&req, &state).and_then(|user| {
        let is_public = form.visibility.as_str() == "public";
        let image_path = store_upload(&state.configuration.media_dir(), &user.username, &form.file)?;
        state
            .store
            .add_picture(user.user_id, &form.title, is_public, &image_path)
    });

    match result {
        Ok(picture) => {
            info!(picture_id = picture.picture_id, "Picture stored");
            HttpResponse::Ok().json(RestResult::ok(picture))
        }
        Err(e) => {
            warn!("Picture upload rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<PictureSummary>(&e))
        }
    }
}

/// Delete a picture along with its comments. Author only.
#[delete("/{id}")]
async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.delete_picture(*path, user.user_id));

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

/// Toggle the caller's like on a picture.
#[post("/{id}/like")]
async fn like(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.toggle_like(*path, user.user_id));

    match result {
        Ok(liked) => HttpResponse::Ok().json(RestResult::ok(LikeResponse { liked })),
        Err(e) => HttpResponse::Ok().json(error_envelope::<LikeResponse>(&e)),
    }
}

#[post("/{id}/comments")]
async fn add_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<CommentRequest>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.add_comment(*path, user.user_id, &body.content));

    match result {
        Ok(comment) => HttpResponse::Ok().json(RestResult::ok(comment)),
        Err(e) => HttpResponse::Ok().json(error_envelope::<CommentView>(&e)),
    }
}

/// Delete a comment; allowed for its author and the picture's author.
#[delete("/{id}/comments/{comment_id}")]
async fn remove_comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(u64, u64)>,
) -> impl Responder {
    let (_, comment_id) = path.into_inner();
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.delete_comment(comment_id, user.user_id));

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

/// Tag another user on a picture.
#[post("/{id}/tags")]
async fn add_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<TagRequest>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|_| state.store.add_tag(*path, &body.tag_username));

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

/// Remove the caller's own tag from a picture.
#[delete("/{id}/tags")]
async fn remove_tag(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.remove_tag(*path, user.user_id));

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

pub fn routes() -> Scope {
    web::scope("/v1/pictures")
        .service(my_pictures)
        .service(friends_pictures)
        .service(public_pictures)
        .service(upload)
        .service(like)
        .service(add_comment)
        .service(remove_comment)
        .service(add_tag)
        .service(remove_tag)
        .service(detail)
        .service(remove)
}
