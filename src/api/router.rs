//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! CORS → Extension → Auth validator (protected routes only) → Audit logger

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    use endpoints::{appointments, auth, doctors, medical_records, medical_summaries, patients, users};

    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", get(auth::logout))
        .route("/auth/verify-token", get(auth::verify))
        .route("/auth/change-password", patch(auth::change_password))
        .route("/users/current", get(users::current))
        .route("/users/role/:role", get(users::by_role))
        .route(
            "/users/:id",
            get(users::get).patch(users::edit).delete(users::delete),
        )
        .route("/doctors", get(doctors::list))
        .route("/doctors/user/:user_id", get(doctors::by_user))
        .route(
            "/doctors/:id",
            get(doctors::get).patch(doctors::edit).delete(doctors::delete),
        )
        .route("/patients", get(patients::list))
        .route(
            "/patients/:id",
            get(patients::get).patch(patients::edit).delete(patients::delete),
        )
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/appointments/doctor/:id", get(appointments::by_doctor))
        .route("/appointments/patient/:id", get(appointments::by_patient))
        .route(
            "/appointments/:id",
            get(appointments::get)
                .patch(appointments::edit)
                .delete(appointments::delete),
        )
        .route(
            "/appointments/:id/options",
            get(appointments::options).post(appointments::propose_options),
        )
        .route("/appointments/:id/assign", patch(appointments::assign))
        .route("/appointments/:id/cancel", patch(appointments::cancel))
        .route("/appointments/:id/finalize", patch(appointments::finalize))
        .route("/medical-records", get(medical_records::list))
        .route(
            "/medical-records/patient/:id",
            get(medical_records::by_patient),
        )
        .route(
            "/medical-records/:id",
            get(medical_records::get).patch(medical_records::edit),
        )
        .route(
            "/medical-summaries",
            get(medical_summaries::list).post(medical_summaries::create),
        )
        .route(
            "/medical-summaries/patient/:id",
            get(medical_summaries::by_patient),
        )
        .route(
            "/medical-summaries/doctor/:id",
            get(medical_summaries::by_doctor),
        )
        .route(
            "/medical-summaries/record/:id",
            get(medical_summaries::by_record),
        )
        .route(
            "/medical-summaries/appointment/:id",
            get(medical_summaries::by_appointment),
        )
        .route(
            "/medical-summaries/:id",
            get(medical_summaries::get)
                .patch(medical_summaries::edit)
                .delete(medical_summaries::delete),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (no bearer token required)
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh-token", post(auth::refresh))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::tests::core_in;

    struct TestApp {
        app: Router,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let app = api_router(core_in(dir.path()));
            Self { app, _dir: dir }
        }

        async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(t) = token {
                builder = builder.header("Authorization", format!("Bearer {t}"));
            }
            let req = match body {
                Some(json) => builder
                    .header("Content-Type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = self.app.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        async fn register(&self, body: Value, token: Option<&str>) -> (StatusCode, Value) {
            self.send("POST", "/api/auth/register", token, Some(body)).await
        }

        async fn login(&self, email: &str) -> String {
            let (status, json) = self
                .send(
                    "POST",
                    "/api/auth/login",
                    None,
                    Some(json!({ "email": email, "password": "Secret1!" })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{json}");
            json["data"]["access_token"].as_str().unwrap().to_string()
        }
    }

    fn admin_body() -> Value {
        json!({
            "first_name": "Laura",
            "last_name": "Gomez",
            "email": "admin@example.com",
            "national_id": "9000",
            "password": "Secret1!",
            "role": "admin"
        })
    }

    fn patient_body(email: &str, national_id: &str) -> Value {
        json!({
            "first_name": "Maria",
            "last_name": "Lopez",
            "email": email,
            "national_id": national_id,
            "password": "Secret1!",
            "role": "patient",
            "blood_type": "O+",
            "address": "Calle 10 #4-20",
            "phone": "3001234567",
            "insurance": "Sura"
        })
    }

    fn doctor_body() -> Value {
        json!({
            "first_name": "Carlos",
            "last_name": "Ruiz",
            "email": "doctor@example.com",
            "national_id": "7000",
            "password": "Secret1!",
            "role": "doctor",
            "specialty": "Cardiology",
            "phone": "3109876543"
        })
    }

    /// Admin, one doctor and one patient, all logged in.
    struct Clinic {
        app: TestApp,
        admin: String,
        doctor: String,
        doctor_id: i64,
        patient: String,
        patient_id: i64,
    }

    async fn clinic() -> Clinic {
        let app = TestApp::new();
        let (status, _) = app.register(admin_body(), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let admin = app.login("admin@example.com").await;

        let (status, json) = app.register(doctor_body(), Some(&admin)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        let doctor_id = json["data"]["doctor"]["id"].as_i64().unwrap();
        let doctor = app.login("doctor@example.com").await;

        let (status, json) = app.register(patient_body("maria@example.com", "5001"), None).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        let patient_id = json["data"]["patient"]["id"].as_i64().unwrap();
        let patient = app.login("maria@example.com").await;

        Clinic {
            app,
            admin,
            doctor,
            doctor_id,
            patient,
            patient_id,
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();
        let (status, json) = app.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = TestApp::new();
        let (status, json) = app.send("GET", "/api/appointments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["statusCode"], 401);
        assert_eq!(json["code"], "UNAUTHORIZED");

        let (status, _) = app
            .send("GET", "/api/appointments", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let app = TestApp::new();
        let (status, _) = app.send("GET", "/nonexistent", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn verify_token_sets_no_store() {
        let c = clinic().await;
        let req = Request::builder()
            .uri("/api/auth/verify-token")
            .header("Authorization", format!("Bearer {}", c.patient))
            .body(Body::empty())
            .unwrap();
        let response = c.app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    }

    #[tokio::test]
    async fn doctor_registration_needs_admin() {
        let c = clinic().await;
        let mut body = doctor_body();
        body["email"] = json!("other.doctor@example.com");
        body["national_id"] = json!("7001");

        let (status, _) = c.app.register(body.clone(), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = c.app.register(body.clone(), Some(&c.patient)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = c.app.register(body, Some(&c.admin)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let c = clinic().await;
        let (status, json) = c
            .app
            .register(patient_body("maria@example.com", "5999"), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["statusCode"], 409);
    }

    #[tokio::test]
    async fn patient_registration_creates_record() {
        let c = clinic().await;
        let uri = format!("/api/medical-records/patient/{}", c.patient_id);
        let (status, json) = c.app.send("GET", &uri, Some(&c.patient), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["patient_id"], c.patient_id);
        assert_eq!(json["data"]["summaries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn malformed_bodies() {
        let c = clinic().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/appointments")
            .header("Authorization", format!("Bearer {}", c.patient))
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = c.app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, json) = c
            .app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": 5 })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "VALIDATION_ERROR");

        let (status, _) = c
            .app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": "  " })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = c
            .app
            .send("GET", "/api/appointments/abc", Some(&c.patient), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lifecycle_through_options_and_summary() {
        let c = clinic().await;
        let app = &c.app;

        let (status, json) = app
            .send(
                "POST",
                "/api/appointments",
                Some(&c.patient),
                Some(json!({ "service_type": "General", "specialty": "Cardiology" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["data"]["status"], "requested");
        assert_eq!(json["data"]["doctor_id"], Value::Null);
        assert_eq!(json["data"]["patient_id"], c.patient_id);
        let id = json["data"]["id"].as_i64().unwrap();

        // Patients cannot propose options.
        let options = json!({ "options": [
            { "doctor_id": c.doctor_id, "proposed_date": "2026-11-03", "estimated_time": "09:00" },
            { "doctor_id": c.doctor_id, "proposed_date": "2026-11-05" }
        ]});
        let uri = format!("/api/appointments/{id}/options");
        let (status, _) = app.send("POST", &uri, Some(&c.patient), Some(options.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = app.send("POST", &uri, Some(&c.admin), Some(options)).await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["data"]["status"], "options_proposed");

        let (status, json) = app.send("GET", &uri, Some(&c.patient), None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = json["data"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        let option_id = listed[0]["id"].as_i64().unwrap();

        // The patient picks an option; choosing the doctor directly is staff-only.
        let assign = format!("/api/appointments/{id}/assign");
        let (status, _) = app
            .send(
                "PATCH",
                &assign,
                Some(&c.patient),
                Some(json!({ "doctor_id": c.doctor_id, "scheduled_date": "2026-11-10" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, json) = app
            .send("PATCH", &assign, Some(&c.patient), Some(json!({ "option_id": option_id })))
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["status"], "scheduled");
        assert_eq!(json["data"]["doctor_id"], c.doctor_id);
        assert_eq!(json["data"]["scheduled_date"], "2026-11-03");

        // Assigning again never overwrites the doctor.
        let (status, _) = app
            .send("PATCH", &assign, Some(&c.admin), Some(json!({ "option_id": option_id })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Scheduled appointments cannot be deleted.
        let (status, _) = app
            .send("DELETE", &format!("/api/appointments/{id}"), Some(&c.admin), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = app
            .send(
                "POST",
                "/api/medical-summaries",
                Some(&c.doctor),
                Some(json!({
                    "appointment_id": id,
                    "summary_date": "2026-11-03",
                    "diagnosis": "Hypertension",
                    "treatment": "Losartan 50mg",
                    "observations": "Control in 3 months"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["data"]["service_type"], "General");
        assert_eq!(json["data"]["doctor_id"], c.doctor_id);

        let (status, json) = app
            .send("GET", &format!("/api/appointments/{id}"), Some(&c.patient), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "finalized");

        let (status, _) = app
            .send("PATCH", &format!("/api/appointments/{id}/cancel"), Some(&c.patient), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let uri = format!("/api/medical-summaries/patient/{}", c.patient_id);
        let (status, json) = app.send("GET", &uri, Some(&c.patient), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn direct_assignment_then_cancel() {
        let c = clinic().await;
        let app = &c.app;
        let (_, json) = app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": "General" })))
            .await;
        let id = json["data"]["id"].as_i64().unwrap();

        let (status, json) = app
            .send(
                "PATCH",
                &format!("/api/appointments/{id}/assign"),
                Some(&c.doctor),
                Some(json!({ "doctor_id": c.doctor_id, "scheduled_date": "2026-12-01" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["data"]["status"], "scheduled");

        let (status, json) = app
            .send("PATCH", &format!("/api/appointments/{id}/cancel"), Some(&c.patient), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "cancelled");

        let (status, json) = app
            .send("GET", "/api/appointments?status=cancelled", Some(&c.admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);

        let (status, _) = app
            .send("DELETE", &format!("/api/appointments/{id}"), Some(&c.admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_option_list_rejected() {
        let c = clinic().await;
        let (_, json) = c
            .app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": "General" })))
            .await;
        let id = json["data"]["id"].as_i64().unwrap();

        let uri = format!("/api/appointments/{id}/options");
        let (status, _) = c
            .app
            .send("POST", &uri, Some(&c.doctor), Some(json!({ "options": [] })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, json) = c
            .app
            .send("GET", &format!("/api/appointments/{id}"), Some(&c.doctor), None)
            .await;
        assert_eq!(json["data"]["status"], "requested");
    }

    #[tokio::test]
    async fn patients_only_see_their_own_data() {
        let c = clinic().await;
        let app = &c.app;
        app.register(patient_body("juan@example.com", "5002"), None).await;
        let other = app.login("juan@example.com").await;

        let (_, json) = app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": "General" })))
            .await;
        let id = json["data"]["id"].as_i64().unwrap();

        let (status, _) = app
            .send("GET", &format!("/api/appointments/{id}"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .send("PATCH", &format!("/api/appointments/{id}/cancel"), Some(&other), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = app.send("GET", "/api/appointments", Some(&other), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"].as_array().unwrap().is_empty());

        let (status, _) = app.send("GET", "/api/patients", Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let uri = format!("/api/medical-records/patient/{}", c.patient_id);
        let (status, _) = app.send("GET", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn staff_must_name_the_patient() {
        let c = clinic().await;
        let (status, _) = c
            .app
            .send("POST", "/api/appointments", Some(&c.admin), Some(json!({ "service_type": "General" })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, json) = c
            .app
            .send(
                "POST",
                "/api/appointments",
                Some(&c.admin),
                Some(json!({ "service_type": "General", "patient_id": c.patient_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["patient_id"], c.patient_id);
    }

    #[tokio::test]
    async fn logout_revokes_access_token() {
        let c = clinic().await;
        let (status, json) = c.app.send("GET", "/api/auth/logout", Some(&c.patient), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(json, Value::Null);

        let (status, _) = c
            .app
            .send("GET", "/api/users/current", Some(&c.patient), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_rotates_tokens() {
        let app = TestApp::new();
        app.register(patient_body("maria@example.com", "5001"), None).await;
        let (_, json) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "maria@example.com", "password": "Secret1!" })),
            )
            .await;
        let refresh = json["data"]["refresh_token"].as_str().unwrap().to_string();

        let body = json!({ "refresh_token": refresh });
        let (status, json) = app
            .send("POST", "/api/auth/refresh-token", None, Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["token_type"], "Bearer");

        // Refresh tokens are single-use.
        let (status, _) = app.send("POST", "/api/auth/refresh-token", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::new();
        app.register(patient_body("maria@example.com", "5001"), None).await;
        let (status, json) = app
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "maria@example.com", "password": "Wrong1!x" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn users_current_and_role_listing() {
        let c = clinic().await;
        let (status, json) = c.app.send("GET", "/api/users/current", Some(&c.doctor), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["role"], "doctor");
        assert_eq!(json["data"]["doctor"]["specialty"], "Cardiology");
        assert!(json["data"].get("password_hash").is_none());

        let (status, _) = c.app.send("GET", "/api/users/role/patient", Some(&c.doctor), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, json) = c.app.send("GET", "/api/users/role/patient", Some(&c.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn doctor_with_history_cannot_be_deleted() {
        let c = clinic().await;
        let app = &c.app;
        let (_, json) = app
            .send("POST", "/api/appointments", Some(&c.patient), Some(json!({ "service_type": "General" })))
            .await;
        let id = json["data"]["id"].as_i64().unwrap();
        app.send(
            "PATCH",
            &format!("/api/appointments/{id}/assign"),
            Some(&c.admin),
            Some(json!({ "doctor_id": c.doctor_id, "scheduled_date": "2026-12-01" })),
        )
        .await;

        let uri = format!("/api/doctors/{}", c.doctor_id);
        let (status, _) = app.send("DELETE", &uri, Some(&c.admin), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = app.send("GET", &uri, Some(&c.patient), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn deleted_doctor_token_is_rejected() {
        let c = clinic().await;
        let app = &c.app;
        let (status, _) = app
            .send("GET", "/api/medical-records", Some(&c.doctor), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/doctors/{}", c.doctor_id);
        let (status, _) = app.send("DELETE", &uri, Some(&c.admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = app
            .send("GET", "/api/medical-records", Some(&c.doctor), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Account no longer exists");
    }
}
