//! End-to-end: compose an instance, serve it on loopback, drive it over HTTP.

use std::time::Duration;

use namerd::lifecycle::Shutdown;
use serde_json::Value;
use tokio::net::TcpListener;

mod common;

#[tokio::test]
async fn test_serve_dtabs_resolution_and_admin() {
    let text = common::fixed_namers_toml(&["/svc/web"]).replace("port = 0\n\n[storage]", "port = 0\napiKey = \"secret\"\n\n[storage]");
    let instance = common::document(&text).unwrap().compose().unwrap();

    let admin = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_url = format!("http://{}", admin.local_addr().unwrap());
    let api_url = format!("http://{}/api/1", api.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { instance.serve(admin, vec![api], &shutdown).await })
    };

    let client = reqwest::Client::new();

    let res = client
        .post(format!("{api_url}/dtabs/default"))
        .body("/svc=>/#/fixed")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let dtab: Value = client
        .get(format!("{api_url}/dtabs/default"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dtab["version"], 1);

    let resolved: Value = client
        .get(format!("{api_url}/resolve"))
        .query(&[("path", "/svc/web/v2")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resolved["prefix"], "/svc/web");
    assert_eq!(resolved["resolution"]["type"], "bound");

    let res = client.get(format!("{admin_url}/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let namers: Value = client
        .get(format!("{admin_url}/admin/namers"))
        .bearer_auth("secret")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(namers[0]["prefix"], "/svc/web");
    assert_eq!(namers[0]["kind"], "fixed");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("servers did not stop")
        .unwrap();
    assert!(result.is_ok());
}
