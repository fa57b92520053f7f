mod common;

use serde_json::json;

use common::{count, cookies_with_token, file, listing_params, run_until, settle, store_with, types_of, MockApi};
use portal::api::{ApiError, Destination};
use portal::cookies::CookieJar;
use portal::entities::{FileOperation, FilesSection, OperationStatus};
use portal::store::{types, Action, FileModalProps, FilesModal};

fn listing(names: &[&str]) -> serde_json::Value {
    let entries: Vec<_> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "path": format!("/home/user/{}", name),
                "system": "frontera.home.user",
                "format": "raw",
                "length": 1024,
                "lastModified": "2020-07-01T10:12:36-05:00"
            })
        })
        .collect();
    json!({ "listing": entries, "reachedEnd": true })
}

fn status_of(action: &Action) -> Option<(FileOperation, OperationStatus)> {
    match action {
        Action::DataFilesSetOperationStatus {
            operation,
            status: Some(status),
        } => Some((*operation, *status)),
        _ => None,
    }
}

#[tokio::test]
async fn test_fetch_files_fills_section() {
    let api = MockApi::new();
    api.reply("list_files", Ok(listing(&["a.txt", "b.txt"])));
    let mut store = store_with(api.clone(), CookieJar::new());

    store.dispatch(Action::FetchFiles {
        params: listing_params("/home/user"),
        section: FilesSection::FilesListing,
    });
    assert!(store.state().files.listings.is_empty());
    let actions = run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_FILES).await;

    assert_eq!(
        types_of(&actions),
        vec![types::DATA_FILES_SET_LOADING, types::DATA_FILES_SET_FILES]
    );
    let section = store.state().files.listing(FilesSection::FilesListing).unwrap();
    assert!(!section.loading);
    assert!(section.reached_end);
    assert_eq!(section.files.len(), 2);
    assert_eq!(section.files[0].length, Some(1024));
    assert_eq!(section.params, Some(listing_params("/home/user")));
}

#[tokio::test]
async fn test_fetch_files_error() {
    let api = MockApi::new();
    api.reply("list_files", Err(ApiError::Status { code: 404, message: "missing".into() }));
    let mut store = store_with(api.clone(), CookieJar::new());

    store.dispatch(Action::FetchFiles {
        params: listing_params("/nope"),
        section: FilesSection::FilesListing,
    });
    run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_ERROR).await;

    let section = store.state().files.listing(FilesSection::FilesListing).unwrap();
    assert!(!section.loading);
    assert!(section.files.is_empty());
    assert!(matches!(section.error, Some(ApiError::Status { code: 404, .. })));
}

#[tokio::test]
async fn test_modal_listing_does_not_supersede_main_listing() {
    let api = MockApi::new();
    let main = api.reply_gated("list_files", Some("/home/user"), Ok(listing(&["main.txt"])));
    api.reply_for("list_files", "/home/user/dest", Ok(listing(&["picked.txt"])));
    let mut store = store_with(api.clone(), CookieJar::new());

    store.dispatch(Action::FetchFiles {
        params: listing_params("/home/user"),
        section: FilesSection::FilesListing,
    });
    store.dispatch(Action::FetchFiles {
        params: listing_params("/home/user/dest"),
        section: FilesSection::Modal,
    });
    main.send(()).unwrap();

    let mut delivered = 0;
    run_until(&mut store, |a| {
        if a.action_type() == types::DATA_FILES_SET_FILES {
            delivered += 1;
        }
        delivered == 2
    })
    .await;

    let files = &store.state().files;
    assert_eq!(files.listing(FilesSection::FilesListing).unwrap().files[0].name, "main.txt");
    assert_eq!(files.listing(FilesSection::Modal).unwrap().files[0].name, "picked.txt");
}

#[tokio::test]
async fn test_modal_fetch_from_ui_fills_modal_section() {
    let api = MockApi::new();
    api.reply_for("list_files", "/home/user", Ok(listing(&["picked.txt"])));
    let mut store = store_with(api.clone(), CookieJar::new());

    let intent: Action = serde_json::from_value(json!({
        "type": "FETCH_FILES_MODAL",
        "payload": {
            "api": "tapis",
            "scheme": "private",
            "system": "frontera.home.user",
            "path": "/home/user",
            "section": "modal"
        }
    }))
    .unwrap();
    store.dispatch(intent);
    let actions = run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_FILES).await;

    assert_eq!(
        types_of(&actions),
        vec![types::FETCH_FILES, types::DATA_FILES_SET_LOADING, types::DATA_FILES_SET_FILES]
    );
    let files = &store.state().files;
    assert!(files.listing(FilesSection::FilesListing).is_none());
    let modal = files.listing(FilesSection::Modal).unwrap();
    assert_eq!(modal.files[0].name, "picked.txt");
    assert_eq!(modal.params.as_ref().map(|p| p.limit), Some(100));
}

#[tokio::test]
async fn test_toolbar_toggles_open_and_close_modals() {
    let api = MockApi::new();
    let mut store = store_with(api.clone(), CookieJar::new());
    let selected = serde_json::to_value(file("a.txt", "raw")).unwrap();

    let toggle = |operation: &str, props: serde_json::Value| -> Action {
        serde_json::from_value(json!({
            "type": "DATA_FILES_TOGGLE_MODAL",
            "payload": { "operation": operation, "props": props }
        }))
        .unwrap()
    };

    store.dispatch(toggle("rename", json!({ "selectedFile": selected.clone() })));
    store.dispatch(toggle("trash", json!({ "selectedFiles": [selected] })));
    let files = &store.state().files;
    assert!(files.is_modal_open(FileOperation::Rename));
    assert!(files.is_modal_open(FileOperation::Trash));
    assert_eq!(
        files.modal_props[&FileOperation::Rename].selected_file.as_ref().map(|f| f.name.as_str()),
        Some("a.txt")
    );

    store.dispatch(toggle("rename", json!({})));
    assert!(!store.state().files.is_modal_open(FileOperation::Rename));
    assert!(store.state().files.is_modal_open(FileOperation::Trash));
}

#[tokio::test]
async fn test_show_path_uses_system_root_dir() {
    let api = MockApi::new();
    api.reply(
        "list_systems",
        Ok(json!([{
            "system": "frontera.home.user",
            "definition": { "id": "frontera.home.user", "storage": { "host": "frontera.tacc.utexas.edu", "rootDir": "/home1/01234/user" } }
        }])),
    );
    let mut store = store_with(api.clone(), CookieJar::new());

    let target = file("a.txt", "raw");
    store.dispatch(Action::DataFilesToggleModal(FilesModal {
        operation: FileOperation::ShowPath,
        props: FileModalProps {
            file: Some(target),
            ..FileModalProps::default()
        },
    }));
    // Nothing to show until the file's system is known
    assert_eq!(store.state().show_path(), None);

    store.dispatch(Action::FetchSystems);
    run_until(&mut store, |a| a.action_type() == types::SYSTEMS_LIST).await;
    assert_eq!(
        store.state().show_path().as_deref(),
        Some("/home1/01234/user/home/user/a.txt")
    );

    store.dispatch(Action::DataFilesToggleModal(FilesModal {
        operation: FileOperation::ShowPath,
        props: FileModalProps::default(),
    }));
    assert_eq!(store.state().show_path(), None);
}

#[tokio::test]
async fn test_rename_refreshes_listing() {
    let api = MockApi::new();
    api.reply("rename_file", Ok(json!({ "name": "b.txt" })));
    api.reply("list_files", Ok(listing(&["b.txt"])));
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    let target = file("a.txt", "raw");
    store.dispatch(Action::DataFilesToggleModal(FilesModal {
        operation: FileOperation::Rename,
        props: FileModalProps {
            selected_file: Some(target.clone()),
            ..FileModalProps::default()
        },
    }));
    assert!(store.state().files.is_modal_open(FileOperation::Rename));

    store.dispatch(Action::DataFilesRename {
        file: target.clone(),
        new_name: "b.txt".to_string(),
        params: listing_params("/home/user"),
    });
    let actions = run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_FILES).await;

    let statuses: Vec<_> = actions.iter().filter_map(status_of).collect();
    assert_eq!(
        statuses,
        vec![
            (FileOperation::Rename, OperationStatus::Running),
            (FileOperation::Rename, OperationStatus::Success)
        ]
    );
    assert_eq!(count(&actions, types::DATA_FILES_RENAME_SUCCESS), 1);
    assert_eq!(count(&actions, types::FETCH_FILES), 1);

    let calls = api.calls("rename_file");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key, "/home/user/a.txt");
    assert_eq!(calls[0].csrf_token.as_deref(), Some("tok3n"));

    let files = &store.state().files;
    assert!(!files.is_modal_open(FileOperation::Rename));
    assert_eq!(files.status(FileOperation::Rename), Some(OperationStatus::Success));
    assert_eq!(files.listing(FilesSection::FilesListing).unwrap().files[0].name, "b.txt");
}

#[tokio::test]
async fn test_rename_rejects_invalid_name() {
    let api = MockApi::new();
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    for bad in ["", "a/b", "it's", "say \"hi\"", "back\\slash"] {
        store.dispatch(Action::DataFilesRename {
            file: file("a.txt", "raw"),
            new_name: bad.to_string(),
            params: listing_params("/home/user"),
        });
        let actions = run_until(&mut store, |a| status_of(a).is_some()).await;
        assert_eq!(
            status_of(actions.last().unwrap()),
            Some((FileOperation::Rename, OperationStatus::Error))
        );
    }

    settle(&mut store).await;
    assert!(api.calls("rename_file").is_empty());
}

#[tokio::test]
async fn test_move_stops_at_first_failure() {
    let api = MockApi::new();
    api.reply_for("move_file", "/home/user/one.txt", Ok(json!({})));
    api.reply_for("move_file", "/home/user/two.txt", Err(ApiError::Status { code: 500, message: "disk".into() }));
    api.reply_for("move_file", "/home/user/three.txt", Ok(json!({})));
    api.reply("list_files", Ok(listing(&["two.txt", "three.txt"])));
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    store.dispatch(Action::DataFilesMove {
        files: vec![file("one.txt", "raw"), file("two.txt", "raw"), file("three.txt", "raw")],
        dest: Destination {
            system: "frontera.home.user".into(),
            path: "/home/user/archive".into(),
        },
        params: listing_params("/home/user"),
    });
    let mut actions = run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_FILES).await;
    actions.extend(settle(&mut store).await);

    let paths: Vec<_> = api.calls("move_file").into_iter().map(|c| c.key).collect();
    assert_eq!(paths, vec!["/home/user/one.txt", "/home/user/two.txt"]);

    let statuses: Vec<_> = actions.iter().filter_map(status_of).collect();
    assert_eq!(
        statuses,
        vec![
            (FileOperation::Move, OperationStatus::Running),
            (FileOperation::Move, OperationStatus::Error)
        ]
    );

    // one.txt already moved, so the listing is reloaded anyway.
    assert_eq!(count(&actions, types::FETCH_FILES), 1);
    let names: Vec<_> = store
        .state()
        .files
        .listing(FilesSection::FilesListing)
        .unwrap()
        .files
        .iter()
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(names, vec!["two.txt", "three.txt"]);
    assert_eq!(store.state().files.status(FileOperation::Move), Some(OperationStatus::Error));
}

#[tokio::test]
async fn test_copy_all_succeed_closes_modal() {
    let api = MockApi::new();
    api.reply("copy_file", Ok(json!({})));
    api.reply("copy_file", Ok(json!({})));
    api.reply("list_files", Ok(listing(&["one.txt", "two.txt"])));
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    let selected = vec![file("one.txt", "raw"), file("two.txt", "raw")];
    store.dispatch(Action::DataFilesToggleModal(FilesModal {
        operation: FileOperation::Copy,
        props: FileModalProps {
            selected_files: selected.clone(),
            ..FileModalProps::default()
        },
    }));
    store.dispatch(Action::DataFilesCopy {
        files: selected,
        dest: Destination {
            system: "frontera.home.user".into(),
            path: "/home/user/backup".into(),
        },
        params: listing_params("/home/user"),
    });
    run_until(&mut store, |a| a.action_type() == types::DATA_FILES_SET_FILES).await;

    assert_eq!(api.calls("copy_file").len(), 2);
    let files = &store.state().files;
    assert_eq!(files.status(FileOperation::Copy), Some(OperationStatus::Success));
    assert!(!files.is_modal_open(FileOperation::Copy));
    assert!(files.listing(FilesSection::Modal).is_none());
}

#[tokio::test]
async fn test_trash_with_empty_selection_does_nothing() {
    let api = MockApi::new();
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    store.dispatch(Action::DataFilesTrash {
        files: Vec::new(),
        params: listing_params("/home/user"),
    });
    let actions = settle(&mut store).await;

    assert!(actions.is_empty());
    assert!(api.calls("trash_file").is_empty());
}

#[tokio::test]
async fn test_download_link() {
    let api = MockApi::new();
    api.reply("download_link", Ok(json!("https://portal.example.org/dl/abc")));
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    store.dispatch(Action::DataFilesDownload {
        file: file("a.txt", "raw"),
        api: "tapis".into(),
        scheme: "private".into(),
    });
    run_until(&mut store, |a| a.action_type() == types::DATA_FILES_DOWNLOAD_LINK).await;

    assert_eq!(
        store.state().files.download_href.as_deref(),
        Some("https://portal.example.org/dl/abc")
    );
}

#[tokio::test]
async fn test_download_folder_is_refused() {
    let api = MockApi::new();
    let mut store = store_with(api.clone(), cookies_with_token("tok3n"));

    store.dispatch(Action::DataFilesDownload {
        file: file("results", "folder"),
        api: "tapis".into(),
        scheme: "private".into(),
    });
    run_until(&mut store, |a| status_of(a).is_some()).await;

    assert!(api.calls("download_link").is_empty());
    assert_eq!(
        store.state().files.status(FileOperation::Download),
        Some(OperationStatus::Error)
    );
}
