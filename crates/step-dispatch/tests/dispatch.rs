use std::sync::{Arc, Mutex};

use page_actions::{DriverCall, Locator, PageFacade, RecordingDriver};
use pagefactory_core_types::{ArgKind, DataTable, StepArg};
use pagefactory_registry::{
    ActionHandler, ActionScope, DeclaredPage, EntityKind, FnAction, PageDefinition,
    RegistryError, RegistryIndex,
};
use step_dispatch::{metrics, DispatchEngine, DispatchError};

type Log = Arc<Mutex<Vec<String>>>;

fn tagged(log: &Log, tag: &'static str) -> Arc<dyn ActionHandler> {
    let log = log.clone();
    Arc::new(FnAction::new(move |args: &[StepArg]| {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        log.lock()
            .unwrap()
            .push(format!("{tag}[{}]", rendered.join(",")));
        Ok(())
    }))
}

struct TypeCredentials;

#[async_trait::async_trait]
impl ActionHandler for TypeCredentials {
    async fn invoke(&self, scope: ActionScope<'_>, args: &[StepArg]) -> anyhow::Result<()> {
        let user = scope.element("Username")?;
        scope.facade.fill(&user, args[0].as_scalar()?).await?;
        Ok(())
    }
}

fn setup(log: &Log) -> (DispatchEngine, Arc<RegistryIndex>) {
    let login = PageDefinition::new("Login", Arc::new(DeclaredPage::new()))
        .element("Username", Locator::css("#username"))
        .action("submit", &[], tagged(log, "submit0"))
        .action("submit", &[ArgKind::Scalar], tagged(log, "submit1"))
        .action("import", &[ArgKind::Table], tagged(log, "import-table"))
        .action("import", &[ArgKind::List], tagged(log, "import-list"))
        .action(
            "register",
            &[ArgKind::Scalar, ArgKind::Table],
            tagged(log, "register"),
        )
        .action("type credentials", &[ArgKind::Scalar], Arc::new(TypeCredentials))
        .action(
            "explode",
            &[],
            Arc::new(FnAction::new(|_args: &[StepArg]| {
                anyhow::bail!("backend returned 500")
            })),
        );
    let registry = Arc::new(RegistryIndex::build(vec![login]).unwrap());
    (DispatchEngine::new(registry.clone()), registry)
}

fn facade() -> PageFacade {
    PageFacade::new(Arc::new(RecordingDriver::new()))
}

#[tokio::test]
async fn login_submit_overloads_dispatch_by_arity() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();
    let facade = facade();

    engine.invoke_action(&page, "submit", &[], &facade).await.unwrap();
    engine
        .invoke_action(&page, "submit", &[StepArg::scalar("admin")], &facade)
        .await
        .unwrap();
    let err = engine
        .invoke_action(
            &page,
            "submit",
            &[StepArg::scalar("a"), StepArg::scalar("b")],
            &facade,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::ActionNotFound { .. }));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["submit0[]".to_string(), "submit1['admin']".to_string()]
    );
}

#[tokio::test]
async fn argument_kind_selects_between_same_arity_overloads() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();
    let facade = facade();

    let table = DataTable::from(vec![vec!["login", "role"], vec!["admin", "root"]]);
    engine
        .invoke_action(&page, "import", &[StepArg::Table(table.clone())], &facade)
        .await
        .unwrap();
    engine
        .invoke_action(
            &page,
            "import",
            &[StepArg::List(vec!["a".into(), "b".into()])],
            &facade,
        )
        .await
        .unwrap();
    engine
        .invoke_action(
            &page,
            "register",
            &[StepArg::scalar("admin"), StepArg::Table(table)],
            &facade,
        )
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "import-table[table[2x2]]".to_string(),
            "import-list[list[2]]".to_string(),
            "register['admin',table[2x2]]".to_string(),
        ]
    );
}

#[tokio::test]
async fn unknown_action_title_is_not_found() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();

    let err = engine
        .invoke_action(&page, "logout", &[], &facade())
        .await
        .unwrap_err();
    assert_eq!(err.title(), "logout");
    assert!(matches!(err, DispatchError::ActionNotFound { declared, .. } if declared.is_empty()));
}

#[tokio::test]
async fn handler_failure_is_wrapped_with_its_cause() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();
    let before = metrics::dispatch_count("failed");

    let err = engine
        .invoke_action(&page, "explode", &[], &facade())
        .await
        .unwrap_err();

    match &err {
        DispatchError::ActionInvocation { page, title, source } => {
            assert_eq!(page, "Login");
            assert_eq!(title, "explode");
            assert_eq!(source.to_string(), "backend returned 500");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert!(metrics::dispatch_count("failed") > before);
}

#[tokio::test]
async fn handlers_drive_the_facade_through_their_scope() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();
    let driver = Arc::new(RecordingDriver::new());
    let facade = PageFacade::new(driver.clone());

    engine
        .invoke_action(
            &page,
            "type credentials",
            &[StepArg::scalar("admin")],
            &facade,
        )
        .await
        .unwrap();

    assert_eq!(
        driver.calls(),
        vec![DriverCall::Fill {
            element: "Username".into(),
            text: "admin".into()
        }]
    );
}

#[test]
fn missing_element_reports_literal_title() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();

    let err = engine.resolve_element(&page, "Password").unwrap_err();
    assert_eq!(err.title(), "Password");
    assert!(err.to_string().contains("Password"));
    assert!(matches!(
        err,
        DispatchError::Registry(RegistryError::NotFound {
            kind: EntityKind::Element,
            ..
        })
    ));

    let element = engine.resolve_element(&page, "Username").unwrap();
    assert_eq!(element.locator, Locator::css("#username"));
}

#[test]
fn dispatch_works_from_a_blocking_context() {
    let log: Log = Default::default();
    let (engine, registry) = setup(&log);
    let page = registry.resolve_page("Login").unwrap();

    tokio_test::block_on(engine.invoke_action(&page, "submit", &[], &facade())).unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}
