use std::sync::Arc;
use std::time::Duration;

use page_actions::{DriverCall, PageFacade, RecordingDriver, SessionSlot};
use pagefactory_page_context::{ContextError, PageCache, PageManager, ScenarioState};
use pagefactory_registry::{
    DeclaredPage, PageDefinition, PageType, RegistryError, RegistryIndex,
};

struct BrokenPage;

#[async_trait::async_trait]
impl PageType for BrokenPage {
    async fn initialize(&self, _facade: &PageFacade) -> anyhow::Result<()> {
        anyhow::bail!("login form never rendered")
    }
}

fn registry() -> Arc<RegistryIndex> {
    Arc::new(
        RegistryIndex::build(vec![
            PageDefinition::new("Login", Arc::new(DeclaredPage::at("https://example.test/login"))),
            PageDefinition::new("Home", Arc::new(DeclaredPage::new())),
            PageDefinition::new("Broken", Arc::new(BrokenPage)),
        ])
        .unwrap(),
    )
}

fn scenario_with_driver(driver: Arc<RecordingDriver>) -> ScenarioState {
    let scenario = ScenarioState::new("login");
    scenario.session().set_session(driver);
    scenario
}

#[test]
fn reading_current_page_before_opening_fails() {
    for _ in 0..3 {
        let scenario = ScenarioState::new("fresh");
        assert!(scenario.context().is_empty());
        let err = scenario.context().get_current_page().unwrap_err();
        assert!(matches!(err, ContextError::Uninitialized { .. }));
    }
}

#[tokio::test]
async fn open_page_navigates_and_sets_current() {
    let driver = Arc::new(RecordingDriver::new());
    let scenario = scenario_with_driver(driver.clone());
    let manager = PageManager::new(registry());

    let page = manager.open_page(&scenario, "Login").await.unwrap();

    let current = scenario.context().get_current_page().unwrap();
    assert!(Arc::ptr_eq(&page, &current));
    assert_eq!(current.title(), "Login");
    assert_eq!(
        driver.calls(),
        vec![DriverCall::Navigate {
            url: "https://example.test/login".into()
        }]
    );
}

#[tokio::test]
async fn reopening_a_page_reuses_the_cached_instance() {
    let driver = Arc::new(RecordingDriver::new());
    let scenario = scenario_with_driver(driver.clone());
    let manager = PageManager::new(registry());

    let first = manager.open_page(&scenario, "Login").await.unwrap();
    manager.open_page(&scenario, "Home").await.unwrap();
    let again = manager.open_page(&scenario, "Login").await.unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(scenario.cache().len(), 2);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn unknown_page_title_is_not_found() {
    let scenario = scenario_with_driver(Arc::new(RecordingDriver::new()));
    let manager = PageManager::new(registry());

    let err = manager.open_page(&scenario, "Checkout").await.unwrap_err();
    match err {
        ContextError::Registry(RegistryError::NotFound { title, .. }) => {
            assert_eq!(title, "Checkout")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(scenario.context().is_empty());
}

#[tokio::test]
async fn failed_initialization_leaves_context_untouched() {
    let scenario = scenario_with_driver(Arc::new(RecordingDriver::new()));
    let manager = PageManager::new(registry());

    manager.open_page(&scenario, "Home").await.unwrap();
    let err = manager.open_page(&scenario, "Broken").await.unwrap_err();

    assert!(matches!(err, ContextError::PageInitialization { ref title, .. } if title == "Broken"));
    assert_eq!(scenario.context().get_current_page().unwrap().title(), "Home");
    assert!(scenario.cache().get("Broken").is_none());
}

#[tokio::test]
async fn navigation_failure_is_an_initialization_failure() {
    let driver = Arc::new(RecordingDriver::new());
    driver.fail_navigation("https://example.test/login", "connection refused");
    let scenario = scenario_with_driver(driver);
    let manager = PageManager::new(registry());

    let err = manager.open_page(&scenario, "Login").await.unwrap_err();
    assert!(matches!(err, ContextError::PageInitialization { .. }));
    assert!(scenario.context().is_empty());
}

#[tokio::test]
async fn opening_without_session_reports_interaction_error() {
    let scenario = ScenarioState::new("no driver");
    let manager = PageManager::new(registry());

    let err = manager.open_page(&scenario, "Login").await.unwrap_err();
    assert!(matches!(err, ContextError::Interaction(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scenarios_keep_separate_current_pages() {
    let manager = PageManager::new(registry());
    let cache = Arc::new(PageCache::new());
    let session = Arc::new(SessionSlot::new());
    session.set_session(Arc::new(RecordingDriver::new()));
    let lock = Arc::new(tokio::sync::Mutex::new(()));

    let mut handles = Vec::new();
    for (idx, title) in ["Login", "Home", "Login", "Home"].into_iter().enumerate() {
        let manager = manager.clone();
        let cache = cache.clone();
        let session = session.clone();
        let lock = lock.clone();
        handles.push(tokio::spawn(async move {
            let scenario = ScenarioState::with_shared(format!("s{idx}"), cache, session, lock);
            manager.open_page(&scenario, title).await.unwrap();
            tokio::task::yield_now().await;
            scenario.context().get_current_page().unwrap().title().to_string()
        }));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    assert_eq!(seen, vec!["Login", "Home", "Login", "Home"]);
}

#[tokio::test]
async fn scenarios_sharing_a_session_share_its_lock() {
    let cache = Arc::new(PageCache::new());
    let session = Arc::new(SessionSlot::new());
    let lock = Arc::new(tokio::sync::Mutex::new(()));
    let a = ScenarioState::with_shared("a", cache.clone(), session.clone(), lock.clone());
    let b = ScenarioState::with_shared("b", cache, session, lock);

    let guard = a.lock().await;
    let blocked = tokio::time::timeout(Duration::from_millis(50), b.lock()).await;
    assert!(blocked.is_err());

    drop(guard);
    let acquired = tokio::time::timeout(Duration::from_millis(50), b.lock()).await;
    assert!(acquired.is_ok());
}

#[tokio::test]
async fn separate_scenarios_lock_independently() {
    let a = ScenarioState::new("a");
    let b = ScenarioState::new("b");

    let _guard = a.lock().await;
    let other = tokio::time::timeout(Duration::from_millis(50), b.lock()).await;
    assert!(other.is_ok());
}

#[test]
fn finishing_a_scenario_clears_the_current_page() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let scenario = scenario_with_driver(Arc::new(RecordingDriver::new()));
    let manager = PageManager::new(registry());

    runtime.block_on(manager.open_page(&scenario, "Home")).unwrap();
    scenario.finish();
    assert!(scenario.context().is_empty());
}

#[test]
fn cache_pages_lists_every_registered_title() {
    let manager = PageManager::new(registry());
    assert_eq!(manager.cache_pages(), vec!["Broken", "Home", "Login"]);
}
