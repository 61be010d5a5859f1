use crate::helpers::spawn_app;

#[tokio::test]
async fn preflight_returns_cors_headers() {
    let app = spawn_app(&["https://example.com/"]).await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let headers = response.headers();
    assert_eq!("*", headers["access-control-allow-origin"]);
    assert_eq!("Content-Type", headers["access-control-allow-headers"]);
    assert_eq!("POST", headers["access-control-allow-methods"]);
    assert_eq!("nosniff", headers["x-content-type-options"]);
    assert_eq!("application/json", headers["content-type"]);
    assert_eq!(r#"{"status":"ok"}"#, response.text().await.unwrap());
}

#[tokio::test]
async fn preflight_is_answered_on_mail_route() {
    let app = spawn_app(&[]).await;

    let response = app
        .client
        .request(reqwest::Method::OPTIONS, format!("{}/mail", &app.address))
        .header("Origin", "https://example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!("POST", response.headers()["access-control-allow-methods"]);
    assert_eq!("*", response.headers()["access-control-allow-origin"]);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn get_mail_is_not_routed() {
    let app = spawn_app(&[]).await;

    let response = app
        .client
        .get(format!("{}/mail", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(405, response.status().as_u16());
    assert!(app.mailer.sent().is_empty());
}
