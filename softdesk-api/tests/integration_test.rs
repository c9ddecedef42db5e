//! End-to-end tests over the HTTP router
//!
//! Every test needs `DATABASE_URL`; without it they return early.

mod common;

use axum::http::{Method, StatusCode};
use common::{ids, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["migrations"]["is_up_to_date"], true);
}

#[tokio::test]
async fn test_registration_age_boundary() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "username": format!("teen-{}", Uuid::new_v4().simple()),
                "password": "Long-Enough-15",
                "age": 14,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "age");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "username": format!("teen-{}", Uuid::new_v4().simple()),
                "password": "Long-Enough-15",
                "age": 15,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["age"], 15);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.user().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({ "username": user.username, "password": "Another-Pass-77", "age": 40 })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_login_and_refresh() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.user().await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "username": user.username, "password": "wrong password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_failed");

    let (_, tokens) = ctx
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "username": user.username, "password": "Correct-Horse-42" })),
        )
        .await;
    assert_eq!(tokens["token_type"], "Bearer");

    let (status, refreshed) = ctx
        .send(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens["refresh_token"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let access = refreshed["access_token"].as_str().unwrap();
    let (status, _) = ctx.get(&format!("/v1/users/{}", user.id), access).await;
    assert_eq!(status, StatusCode::OK);

    // An access token is not a refresh token
    let (status, _) = ctx
        .send(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens["access_token"] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // ...and a refresh token does not open protected routes
    let (status, _) = ctx
        .get("/v1/projects", tokens["refresh_token"].as_str().unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let Some(ctx) = TestContext::new().await else { return };

    let (status, body) = ctx.send(Method::GET, "/v1/projects", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "authentication_failed");
}

#[tokio::test]
async fn test_scenario_alpha() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;
    let b = ctx.user().await;
    let c = ctx.user().await;

    // A creates a project; B can't see it
    let project = ctx.project(&a, "Alpha").await;

    let (_, listed) = ctx.get("/v1/projects", &b.token).await;
    assert!(!ids(&listed).contains(&project));

    let (status, body) = ctx.get(&format!("/v1/projects/{}", project), &b.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let issues_uri = format!("/v1/projects/{}/issues", project);
    let (status, _) = ctx.post(&issues_uri, &b.token, json!({ "title": "Sneaky" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A adds B; adding twice conflicts
    ctx.add_contributor(&a, project, &b).await;

    let (status, body) = ctx
        .post(
            &format!("/v1/projects/{}/contributors", project),
            &a.token,
            json!({ "user": b.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // B now sees the project and can assign A
    let (_, listed) = ctx.get("/v1/projects", &b.token).await;
    assert!(ids(&listed).contains(&project));

    let (status, issue) = ctx
        .post(&issues_uri, &b.token, json!({ "title": "Login fails", "tag": "bug", "assignee": a.id }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", issue);
    assert_eq!(issue["assignee_id"], json!(a.id));
    assert_eq!(issue["author_id"], json!(b.id));
    assert_eq!(issue["status"], "todo");

    // ...but not C, who is not a contributor
    let (status, body) = ctx
        .post(&issues_uri, &b.token, json!({ "title": "Other", "assignee": c.id }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "assignee");

    let issue_uri = format!("{}/{}", issues_uri, issue["id"].as_str().unwrap());
    let (status, _) = ctx.patch(&issue_uri, &b.token, json!({ "assignee": c.id })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // B cannot remove A's founding membership
    let (_, roster) = ctx
        .get(&format!("/v1/projects/{}/contributors", project), &b.token)
        .await;
    let founding = roster
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["role"] == "author")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = ctx
        .delete(
            &format!("/v1/projects/{}/contributors/{}", project, founding),
            &b.token,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    // Nor may B edit the project
    let (status, _) = ctx
        .patch(&format!("/v1/projects/{}", project), &b.token, json!({ "name": "Beta" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_removing_contributor_clears_assignments() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;
    let b = ctx.user().await;

    let project = ctx.project(&a, "Cleanup").await;
    let membership = ctx.add_contributor(&a, project, &b).await;

    let issues_uri = format!("/v1/projects/{}/issues", project);
    let (_, issue) = ctx
        .post(&issues_uri, &a.token, json!({ "title": "Deploy", "assignee": b.id }))
        .await;
    let issue_uri = format!("{}/{}", issues_uri, issue["id"].as_str().unwrap());

    let (status, body) = ctx
        .delete(
            &format!("/v1/projects/{}/contributors/{}", project, membership),
            &a.token,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    let (_, issue) = ctx.get(&issue_uri, &a.token).await;
    assert_eq!(issue["assignee_id"], serde_json::Value::Null);

    // B is gone from the project entirely
    let (status, _) = ctx.get(&issue_uri, &b.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_issue_listing_respects_membership_and_filters() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;
    let outsider = ctx.user().await;

    let project = ctx.project(&a, "Listing").await;
    let issues_uri = format!("/v1/projects/{}/issues", project);

    let (_, todo) = ctx.post(&issues_uri, &a.token, json!({ "title": "One" })).await;
    let (_, done) = ctx
        .post(&issues_uri, &a.token, json!({ "title": "Two", "status": "finished", "priority": "high" }))
        .await;

    let (_, all) = ctx.get("/v1/issues", &a.token).await;
    let all = ids(&all);
    assert!(all.contains(&Uuid::parse_str(todo["id"].as_str().unwrap()).unwrap()));
    assert!(all.contains(&Uuid::parse_str(done["id"].as_str().unwrap()).unwrap()));

    let (status, finished) = ctx
        .get(&format!("{}?status=finished&priority=high", issues_uri), &a.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished.as_array().unwrap().len(), 1);
    assert_eq!(finished[0]["title"], "Two");

    let (_, paged) = ctx.get(&format!("{}?limit=1&offset=1", issues_uri), &a.token).await;
    assert_eq!(paged.as_array().unwrap().len(), 1);

    // The outsider sees none of it, whatever the filters
    for uri in ["/v1/issues", "/v1/issues?status=finished", "/v1/issues?limit=100&offset=0"] {
        let (status, body) = ctx.get(uri, &outsider.token).await;
        assert_eq!(status, StatusCode::OK);
        let visible = ids(&body);
        assert!(!visible.contains(&Uuid::parse_str(todo["id"].as_str().unwrap()).unwrap()));
        assert!(!visible.contains(&Uuid::parse_str(done["id"].as_str().unwrap()).unwrap()));
    }

    let (status, _) = ctx.get(&issues_uri, &outsider.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get("/v1/issues?status=someday", &a.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_permissions() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;
    let b = ctx.user().await;
    let outsider = ctx.user().await;

    let project = ctx.project(&a, "Comments").await;
    ctx.add_contributor(&a, project, &b).await;

    let (_, issue) = ctx
        .post(&format!("/v1/projects/{}/issues", project), &a.token, json!({ "title": "Crash" }))
        .await;
    let comments_uri = format!(
        "/v1/projects/{}/issues/{}/comments",
        project,
        issue["id"].as_str().unwrap()
    );

    let (status, comment) = ctx
        .post(&comments_uri, &b.token, json!({ "content": "Reproduced on 1.2" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_uri = format!("{}/{}", comments_uri, comment["id"].as_str().unwrap());

    let (status, _) = ctx.post(&comments_uri, &b.token, json!({ "content": "  " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Project author is a member but not the writer
    let (status, _) = ctx.patch(&comment_uri, &a.token, json!({ "content": "Edited" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = ctx.patch(&comment_uri, &b.token, json!({ "content": "Reproduced on 1.3" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "Reproduced on 1.3");

    let (status, _) = ctx.get(&comments_uri, &outsider.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .post(&comments_uri, &outsider.token, json!({ "content": "hi" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.delete(&comment_uri, &b.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&comment_uri, &b.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_self_management() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;
    let b = ctx.user().await;

    let (_, listed) = ctx.get("/v1/users", &a.token).await;
    assert_eq!(ids(&listed), vec![a.id]);

    let (status, body) = ctx
        .patch(&format!("/v1/users/{}", b.id), &a.token, json!({ "can_be_contacted": false }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, body) = ctx
        .patch(&format!("/v1/users/{}", a.id), &a.token, json!({ "can_data_be_shared": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_data_be_shared"], true);

    let (status, _) = ctx
        .patch(&format!("/v1/users/{}", a.id), &a.token, json!({ "age": 99 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = ctx.delete(&format!("/v1/users/{}", a.id), &a.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The deleted user's token no longer authenticates
    let (status, _) = ctx.get("/v1/projects", &a.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_requests() {
    let Some(ctx) = TestContext::new().await else { return };
    let a = ctx.user().await;

    let (status, body) = ctx.get("/v1/projects/not-a-uuid", &a.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx
        .post("/v1/projects", &a.token, json!({ "name": "No type" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = ctx
        .post("/v1/projects", &a.token, json!({ "name": "ab", "type": "ios" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
}
