use crate::contact::inbox::ContactInbox;
use crate::contact::types::ContactForm;
use crate::shared::types::app::ApiError;

use actix_web::{post, HttpResponse, web::{self, Data}};
use serde::Serialize;
use uuid::Uuid;


#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactReturn {
    success: bool,
    message: String,
    submission_id: Uuid
}

#[post("/api/contact")]
async fn submit_contact(inbox: Data<ContactInbox>, params: web::Json<ContactForm>) -> Result<HttpResponse, ApiError> {
    let submission = inbox.submit(params.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ContactReturn {
        success: true,
        message: "Thank you for your message! We'll be in touch soon.".to_string(),
        submission_id: submission.id
    }))
}
