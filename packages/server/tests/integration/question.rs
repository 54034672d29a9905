use crate::common::{TestApp, Upload, png_bytes, routes};
use serde_json::{Value, json};

fn objective(enunciado: &str) -> Value {
    json!({
        "enunciado": enunciado,
        "numero": 1,
        "alternativas": [
            {"id": -1, "alternativa_txt": "Amoxicilina", "correta": true},
            {"id": -2, "alternativa_txt": "Azitromicina"},
            {"id": -3, "alternativa_txt": "Ceftriaxona"}
        ]
    })
}

fn upload<'a>(part: &'a str, file_name: &'a str) -> Upload<'a> {
    Upload {
        part,
        file_name,
        bytes: png_bytes(),
    }
}

fn alternative_ids(body: &Value) -> Vec<i64> {
    body["alternativas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect()
}

mod create {
    use super::*;

    #[tokio::test]
    async fn objective_question_with_images() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let res = app
            .create_question(
                exam,
                &objective("  Criança de 3 anos com otite. Conduta?  "),
                vec![
                    upload("enunciado", "otoscopia.png"),
                    upload("alternativa:-2", "grafico.png"),
                ],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["enunciado"], "Criança de 3 anos com otite. Conduta?");
        assert_eq!(res.body["prova"], exam);

        let prompt = res.body["imagens_enunciado"].as_array().unwrap();
        assert_eq!(prompt.len(), 1);
        let prompt_url = prompt[0].as_str().unwrap();
        assert!(prompt_url.starts_with(&app.public_prefix()));
        assert!(prompt_url.ends_with("-otoscopia.png"));
        assert!(app.object_exists(prompt_url));

        let alts = res.body["alternativas"].as_array().unwrap();
        assert_eq!(alts.len(), 3);
        assert_eq!(alts[0]["alternativa_txt"], "Amoxicilina");
        assert_eq!(alts[0]["correta"], true);
        assert_eq!(alts[1]["imagens"].as_array().unwrap().len(), 1);
        assert!(alts[2]["imagens"].as_array().unwrap().is_empty());
        // The correct entry was new in this save.
        assert!(res.body["alternativa_Correta"].is_null());
    }

    #[tokio::test]
    async fn invalid_form_reports_each_field() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let res = app
            .create_question(
                exam,
                &json!({
                    "enunciado": " ",
                    "alternativas": [{"id": -1, "alternativa_txt": "Única"}]
                }),
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        let fields = &res.body["fields"];
        assert!(fields["enunciado"].is_string());
        assert!(fields["alternativas"].is_string());
        assert!(fields["correta"].is_string());

        let list = app.get_with_token(&routes::exam_questions(exam), &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn free_response_needs_no_alternatives() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let res = app
            .create_question(
                exam,
                &json!({"enunciado": "Descreva o manejo da sepse.", "discursiva": true}),
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["discursiva"], true);
        assert!(res.body["alternativas"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn taxonomy_must_form_a_chain() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;
        let (cat, sub, subj) = app.seed_taxonomy("Pediatria").await;
        let (other_cat, _, _) = app.seed_taxonomy("Cirurgia").await;

        let mut payload = objective("Lactente com bronquiolite.");
        payload["categoria"] = json!(other_cat);
        payload["subcategoria"] = json!(sub);
        payload["assunto"] = json!(subj);
        let res = app.create_question(exam, &payload, vec![], &token).await;
        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["subcategoria"].is_string());

        payload["assunto"] = json!(99999);
        let res = app.create_question(exam, &payload, vec![], &token).await;
        assert!(res.body["fields"]["assunto"].is_string());

        payload["categoria"] = json!(cat);
        payload["assunto"] = json!(subj);
        let res = app.create_question(exam, &payload, vec![], &token).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["assunto"], subj);
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let res = app
            .create_question(
                exam,
                &objective("Questão"),
                vec![upload("enunciado", "notas.txt")],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("not an image"));
    }

    #[tokio::test]
    async fn upload_for_unknown_alternative_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let res = app
            .create_question(
                exam,
                &objective("Questão"),
                vec![upload("alternativa:-9", "a.png")],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod edit {
    use super::*;

    #[tokio::test]
    async fn removed_alternative_is_deleted_and_new_one_appended() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(
                exam,
                &objective("Qual o antibiótico?"),
                vec![upload("alternativa:-2", "b.png")],
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let question_id = created.id();
        let ids = alternative_ids(&created.body);
        let removed_image = created.body["alternativas"][1]["imagens"][0]
            .as_str()
            .unwrap()
            .to_string();
        assert!(app.object_exists(&removed_image));

        let res = app
            .save_question(
                question_id,
                &json!({
                    "enunciado": "Qual o antibiótico de escolha?",
                    "alternativas": [
                        {"id": ids[0], "alternativa_txt": "Amoxicilina", "correta": true},
                        {"id": ids[2], "alternativa_txt": "Ceftriaxona IM"},
                        {"id": -1, "alternativa_txt": "Observação clínica"}
                    ]
                }),
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["enunciado"], "Qual o antibiótico de escolha?");
        let after = alternative_ids(&res.body);
        assert_eq!(after.len(), 3);
        assert_eq!(&after[..2], &[ids[0], ids[2]]);
        assert!(after[2] > ids[2]);
        assert_eq!(res.body["alternativas"][1]["alternativa_txt"], "Ceftriaxona IM");
        assert_eq!(res.body["alternativa_Correta"], ids[0]);
        assert!(!app.object_exists(&removed_image));
    }

    #[tokio::test]
    async fn prompt_images_keep_order_and_drop_removed() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(
                exam,
                &objective("Imagem"),
                vec![upload("enunciado", "um.png"), upload("enunciado", "dois.png")],
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let question_id = created.id();
        let first = created.body["imagens_enunciado"][0].as_str().unwrap().to_string();
        let second = created.body["imagens_enunciado"][1].as_str().unwrap().to_string();
        let ids = alternative_ids(&created.body);

        let res = app
            .save_question(
                question_id,
                &json!({
                    "enunciado": "Imagem",
                    "imagens_enunciado": [first, second],
                    "removed_imagens_enunciado": [first],
                    "alternativas": [
                        {"id": ids[0], "alternativa_txt": "A", "correta": true},
                        {"id": ids[1], "alternativa_txt": "B"},
                        {"id": ids[2], "alternativa_txt": "C"}
                    ]
                }),
                vec![upload("enunciado", "tres.png")],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let images = res.body["imagens_enunciado"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0], second.as_str());
        let third = images[1].as_str().unwrap();
        assert!(third.contains(&format!("/questoes/{question_id}/enunciado/")));
        assert!(!app.object_exists(&first));
        assert!(app.object_exists(&second));
        assert!(app.object_exists(third));
    }

    #[tokio::test]
    async fn free_response_keeps_stored_answer_key() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(exam, &objective("Questão"), vec![], &token)
            .await;
        let question_id = created.id();
        let ids = alternative_ids(&created.body);
        let payload = |discursiva: bool| {
            json!({
                "enunciado": "Questão",
                "discursiva": discursiva,
                "alternativas": [
                    {"id": ids[0], "alternativa_txt": "A"},
                    {"id": ids[1], "alternativa_txt": "B", "correta": true},
                    {"id": ids[2], "alternativa_txt": "C"}
                ]
            })
        };

        let res = app
            .save_question(question_id, &payload(false), vec![], &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["alternativa_Correta"], ids[1]);

        let mut free = payload(true);
        free["alternativas"] = json!([]);
        let res = app.save_question(question_id, &free, vec![], &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["alternativa_Correta"], ids[1]);
        assert!(res.body["alternativas"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn alternative_of_another_question_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let a = app
            .create_question(exam, &objective("Primeira"), vec![], &token)
            .await;
        let b = app
            .create_question(exam, &objective("Segunda"), vec![], &token)
            .await;
        let foreign = alternative_ids(&b.body)[0];
        let own = alternative_ids(&a.body);

        let res = app
            .save_question(
                a.id(),
                &json!({
                    "enunciado": "Primeira",
                    "alternativas": [
                        {"id": own[0], "alternativa_txt": "A", "correta": true},
                        {"id": foreign, "alternativa_txt": "Roubada"}
                    ]
                }),
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["alternativas"].is_string());

        let other = app.get_with_token(&routes::question(b.id()), &token).await;
        assert_eq!(other.body["alternativas"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn images_of_another_question_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let victim = app
            .create_question(
                exam,
                &objective("Primeira"),
                vec![upload("enunciado", "alvo.png")],
                &token,
            )
            .await;
        assert_eq!(victim.status, 201, "{}", victim.text);
        let target = victim.body["imagens_enunciado"][0].as_str().unwrap().to_string();

        let other = app
            .create_question(exam, &objective("Segunda"), vec![], &token)
            .await;
        let ids = alternative_ids(&other.body);
        let alternatives = json!([
            {"id": ids[0], "alternativa_txt": "A", "correta": true},
            {"id": ids[1], "alternativa_txt": "B"},
            {"id": ids[2], "alternativa_txt": "C"}
        ]);

        let res = app
            .save_question(
                other.id(),
                &json!({
                    "enunciado": "Segunda",
                    "removed_imagens_enunciado": [target],
                    "alternativas": alternatives
                }),
                vec![],
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert!(res.body["fields"]["imagens_enunciado"].is_string());
        assert!(app.object_exists(&target));

        let res = app
            .save_question(
                other.id(),
                &json!({
                    "enunciado": "Segunda",
                    "imagens_enunciado": [target],
                    "alternativas": alternatives
                }),
                vec![],
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);

        let res = app
            .create_question(
                exam,
                &json!({
                    "enunciado": "Terceira",
                    "alternativas": [
                        {"id": -1, "alternativa_txt": "A", "correta": true, "removed_imagens": [target]},
                        {"id": -2, "alternativa_txt": "B"}
                    ]
                }),
                vec![],
                &token,
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert!(res.body["fields"]["alternativas"].is_string());

        assert!(app.object_exists(&target));
        let stored = app.get_with_token(&routes::question(victim.id()), &token).await;
        assert_eq!(stored.body["imagens_enunciado"][0], target.as_str());
        let stored = app.get_with_token(&routes::question(other.id()), &token).await;
        assert!(stored.body["imagens_enunciado"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_images_left_out_of_the_form_are_removed() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(
                exam,
                &objective("Imagem"),
                vec![upload("enunciado", "um.png"), upload("alternativa:-1", "a.png")],
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let prompt = created.body["imagens_enunciado"][0].as_str().unwrap().to_string();
        let alt_image = created.body["alternativas"][0]["imagens"][0]
            .as_str()
            .unwrap()
            .to_string();
        let ids = alternative_ids(&created.body);

        let res = app
            .save_question(
                created.id(),
                &json!({
                    "enunciado": "Imagem",
                    "alternativas": [
                        {"id": ids[0], "alternativa_txt": "A", "correta": true},
                        {"id": ids[1], "alternativa_txt": "B"},
                        {"id": ids[2], "alternativa_txt": "C"}
                    ]
                }),
                vec![],
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["imagens_enunciado"].as_array().unwrap().is_empty());
        assert!(res.body["alternativas"][0]["imagens"].as_array().unwrap().is_empty());
        assert!(!app.object_exists(&prompt));
        assert!(!app.object_exists(&alt_image));
    }

    #[tokio::test]
    async fn saving_missing_question_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app
            .save_question(777, &objective("Questão"), vec![], &token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn questions_are_listed_by_number_with_alternatives() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let mut second = objective("Segunda");
        second["numero"] = json!(2);
        app.create_question(exam, &second, vec![], &token).await;
        app.create_question(exam, &objective("Primeira"), vec![], &token)
            .await;

        let res = app.get_with_token(&routes::exam_questions(exam), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["enunciado"], "Primeira");
        assert_eq!(list[1]["enunciado"], "Segunda");
        assert_eq!(list[1]["alternativas"].as_array().unwrap().len(), 3);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_rows_and_images() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(
                exam,
                &objective("Questão"),
                vec![upload("enunciado", "p.png"), upload("alternativa:-1", "a.png")],
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let prompt = created.body["imagens_enunciado"][0].as_str().unwrap().to_string();
        let alt_image = created.body["alternativas"][0]["imagens"][0]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .delete_with_token(&routes::question(created.id()), &token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_with_token(&routes::question(created.id()), &token).await;
        assert_eq!(res.status, 404);
        assert!(!app.object_exists(&prompt));
        assert!(!app.object_exists(&alt_image));
    }

    #[tokio::test]
    async fn image_removal_failure_does_not_block_delete() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;
        let exam = app.create_exam_fixture(&token).await;

        let created = app
            .create_question(
                exam,
                &objective("Questão"),
                vec![upload("enunciado", "p.png"), upload("alternativa:-1", "a.png")],
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let prompt = created.body["imagens_enunciado"][0].as_str().unwrap().to_string();
        let alt_image = created.body["alternativas"][0]["imagens"][0]
            .as_str()
            .unwrap()
            .to_string();

        // A non-empty directory in place of the object makes its removal fail.
        let blocked = app.object_file(&prompt);
        std::fs::remove_file(&blocked).unwrap();
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), b"x").unwrap();

        let res = app
            .delete_with_token(&routes::question(created.id()), &token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_with_token(&routes::question(created.id()), &token).await;
        assert_eq!(res.status, 404);
        let list = app.get_with_token(&routes::exam_questions(exam), &token).await;
        assert!(list.body.as_array().unwrap().is_empty());
        assert!(!app.object_exists(&alt_image));
    }
}
