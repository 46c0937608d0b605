use dockerize_core::ErrorKind;
use dockerize_tools::error::ToolError;
use dockerize_tools::executor::ToolExecutor;
use dockerize_tools::npm::{NpmClient, NpmError};
use mockall::mock;
use std::path::{Path, PathBuf};

mock! {
    Executor {}

    impl ToolExecutor for Executor {
        async fn exec(&self, args: &[String]) -> Result<String, ToolError>;
        async fn exec_streaming(&self, args: &[String]) -> Result<(), ToolError>;
    }
}

#[tokio::test]
async fn pack_returns_archive_in_destination() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|args| {
            args.to_vec() == vec![
                "pack".to_owned(),
                "/srv/app".to_owned(),
                "--pack-destination".to_owned(),
                "/tmp/staging".to_owned(),
            ]
        })
        .times(1)
        .returning(|_| Ok("org-app-2.0.0.tgz\n".to_owned()));

    let client = NpmClient::with_executor(mock);
    let archive = client
        .pack(Path::new("/srv/app"), Path::new("/tmp/staging"))
        .await
        .unwrap();

    assert_eq!(archive, PathBuf::from("/tmp/staging/org-app-2.0.0.tgz"));
}

#[tokio::test]
async fn pack_uses_last_non_empty_line() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_| Ok("> app@1.0.0 prepack\n> tsc\n\napp-1.0.0.tgz\n\n".to_owned()));

    let client = NpmClient::with_executor(mock);
    let archive = client
        .pack(Path::new("/srv/app"), Path::new("/tmp/staging"))
        .await
        .unwrap();

    assert_eq!(archive, PathBuf::from("/tmp/staging/app-1.0.0.tgz"));
}

#[tokio::test]
async fn pack_without_output_is_an_error() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|_| Ok("\n".to_owned()));

    let client = NpmClient::with_executor(mock);
    let err = client
        .pack(Path::new("/srv/app"), Path::new("/tmp/staging"))
        .await
        .unwrap_err();

    assert!(matches!(err, NpmError::NoArchive { .. }));
    assert_eq!(err.kind(), ErrorKind::ExternalTool);
}

#[tokio::test]
async fn pack_failure_is_external_tool_error() {
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(|_| {
        Err(ToolError::CommandFailed {
            program: "npm".to_owned(),
            args: vec![],
            status: "exit status: 1".to_owned(),
            stderr: "npm ERR! Invalid package".to_owned(),
        })
    });

    let client = NpmClient::with_executor(mock);
    let err = client
        .pack(Path::new("/srv/app"), Path::new("/tmp/staging"))
        .await
        .unwrap_err();

    assert!(matches!(err, NpmError::Pack { .. }));
    assert!(err.to_string().contains("npm ERR! Invalid package"));
}
