use crate::common::{TestApp, Upload, png_bytes};
use serde_json::json;

async fn uploaded_image(app: &TestApp) -> String {
    let token = app.admin_token().await;
    let exam = app.create_exam_fixture(&token).await;
    let res = app
        .create_question(
            exam,
            &json!({"enunciado": "Observe a imagem.", "discursiva": true}),
            vec![Upload {
                part: "enunciado",
                file_name: "ecg.png",
                bytes: png_bytes(),
            }],
            &token,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    res.body["imagens_enunciado"][0].as_str().unwrap().to_string()
}

#[tokio::test]
async fn public_url_serves_the_image_without_a_token() {
    let app = TestApp::spawn().await;
    let url = uploaded_image(&app).await;

    let res = app.client.get(&url).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert!(res.headers().contains_key("etag"));
    assert_eq!(res.bytes().await.unwrap().to_vec(), png_bytes());
}

#[tokio::test]
async fn matching_etag_is_not_modified() {
    let app = TestApp::spawn().await;
    let url = uploaded_image(&app).await;

    let first = app.client.get(&url).send().await.unwrap();
    let etag = first.headers()["etag"].to_str().unwrap().to_string();

    let res = app
        .client
        .get(&url)
        .header("If-None-Match", etag)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 304);
}

#[tokio::test]
async fn unknown_key_or_bucket_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .get(format!("{}/questoes/1/enunciado/missing.png", app.public_prefix()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = app
        .client
        .get(app.url("/storage/other-bucket/questoes/1/enunciado/x.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}
