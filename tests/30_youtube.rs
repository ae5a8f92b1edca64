mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn callback_rejects_missing_code() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();

    let res = client
        .post(format!("{}/api/youtube/callback", app.base_url))
        .bearer_auth(common::mint_token("user_yt"))
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "No authorization code provided");
    Ok(())
}

#[tokio::test]
async fn callback_exchanges_code_and_stores_tokens() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();

    let res = client
        .post(format!("{}/api/youtube/callback", app.base_url))
        .bearer_auth(common::mint_token("user_yt_connect"))
        .json(&json!({ "code": "auth-code-123" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let stored = app
        .store
        .youtube_token("user_yt_connect")
        .expect("token stored");
    assert_eq!(stored["access_token"], "google-access-token");
    assert_eq!(stored["refresh_token"], "google-refresh-token");
    Ok(())
}

#[tokio::test]
async fn status_reflects_connection_state() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();
    let token = common::mint_token("user_yt_status");

    let res = client
        .get(format!("{}/api/youtube/status", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["data"]["connected"], false);

    app.store.seed_youtube_token("user_yt_status", "yt-token");

    let res = client
        .get(format!("{}/api/youtube/status", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["data"]["connected"], true);
    Ok(())
}

#[tokio::test]
async fn analyze_buckets_recent_liked_videos() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();
    app.store.seed_youtube_token("user_yt_analyze", "yt-token");

    let res = client
        .post(format!("{}/api/youtube/analyze", app.base_url))
        .bearer_auth(common::mint_token("user_yt_analyze"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let metrics = &body["data"]["metrics"];

    // The stale video falls outside the 60-day window.
    assert_eq!(metrics["totalVideos"], 3);
    assert_eq!(metrics["happyCount"], 1);
    assert_eq!(metrics["sadCount"], 1);
    assert_eq!(metrics["energeticCount"], 1);
    assert_eq!(metrics["calmCount"], 0);
    assert_eq!(metrics["videos"].as_array().unwrap().len(), 3);
    assert!(!body["data"]["report"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn analyze_without_connection_is_not_found() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();

    let res = client
        .post(format!("{}/api/youtube/analyze", app.base_url))
        .bearer_auth(common::mint_token("user_yt_never"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "No YouTube access token found");
    Ok(())
}

#[tokio::test]
async fn report_round_trips_through_the_store() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();
    let token = common::mint_token("user_yt_report");
    app.store.seed_youtube_token("user_yt_report", "yt-token");

    // No report until an analysis has run.
    let res = client
        .get(format!("{}/api/youtube/report", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    client
        .post(format!("{}/api/youtube/analyze", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    let res = client
        .get(format!("{}/api/youtube/report", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["metrics"]["totalVideos"], 3);
    assert!(!body["data"]["report"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn disconnect_clears_token_and_report() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = common::client();
    let token = common::mint_token("user_yt_disconnect");
    app.store.seed_youtube_token("user_yt_disconnect", "yt-token");

    let res = client
        .post(format!("{}/api/youtube/disconnect", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?["data"]["message"],
        "YouTube token cleared"
    );

    let res = client
        .get(format!("{}/api/youtube/status", app.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["data"]["connected"], false);
    Ok(())
}
