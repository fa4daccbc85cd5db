//! Declarative pages
//!
//! Pages, elements and actions described in YAML. An action is a script of
//! facade operations; `$1`..`$n` in its text stand for the step's positional
//! scalar arguments, `$list` and `$table` for its list and table arguments.
//! Table arguments with the wrong shape fail as argument errors.
//!
//! ```yaml
//! pages:
//!   - title: Login
//!     url: https://example.test/login
//!     elements:
//!       - { title: Username, locator: "#username" }
//!       - { title: Submit, locator: "xpath://button[@type='submit']" }
//!     actions:
//!       - title: submit
//!         params: [scalar]
//!         script:
//!           - fill: { element: Username, text: "$1" }
//!           - click: Submit
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use page_actions::Locator;
use pagefactory_core_types::{ArgError, ArgKind, StepArg};
use pagefactory_registry::{
    ActionHandler, ActionScope, DeclaredPage, PageDefinition, PageSource,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static POSITIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesFile {
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub title: String,
    pub locator: Locator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub title: String,
    #[serde(default)]
    pub params: Vec<ArgKind>,
    /// Operations are single-key maps (`- click: Submit`), not YAML tags.
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub script: Vec<ScriptOp>,
}

/// One facade operation inside a scripted action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptOp {
    Navigate(String),
    Fill {
        element: String,
        text: String,
    },
    Click(String),
    Press {
        key: String,
        #[serde(default)]
        element: Option<String>,
    },
    Select {
        element: String,
        option: String,
    },
    SetCheckbox {
        element: String,
        #[serde(default = "checked")]
        checked: bool,
    },
    /// Click every element named in the list argument.
    ClickEach(String),
    /// Fill from the table argument; each row is `| element | text |`.
    FillTable,
    /// Fill from the table argument; the header row names the elements and
    /// every following row is one record.
    FillRecords,
    ExpectEqual {
        element: String,
        text: String,
    },
}

fn checked() -> bool {
    true
}

/// Action handler that plays a [`ScriptOp`] sequence through the facade.
#[derive(Debug, Clone)]
pub struct ScriptedAction {
    params: Vec<ArgKind>,
    script: Vec<ScriptOp>,
}

impl ScriptedAction {
    /// Rejects scripts that reference arguments the signature does not declare.
    pub fn new(params: Vec<ArgKind>, script: Vec<ScriptOp>) -> Result<Self> {
        let action = Self { params, script };
        action.validate()?;
        Ok(action)
    }

    fn validate(&self) -> Result<()> {
        for op in &self.script {
            for text in op.texts() {
                for caps in POSITIONAL.captures_iter(text) {
                    let idx: usize = caps[1].parse()?;
                    match idx.checked_sub(1).and_then(|i| self.params.get(i)) {
                        Some(ArgKind::Scalar) => {}
                        Some(other) => bail!("${} refers to a {} parameter", idx, other),
                        None => bail!(
                            "${} exceeds the {} declared parameters",
                            idx,
                            self.params.len()
                        ),
                    }
                }
            }
            match op {
                ScriptOp::ClickEach(source) if source != "$list" => {
                    bail!("click_each expects \"$list\", got '{}'", source)
                }
                ScriptOp::ClickEach(_) if !self.params.contains(&ArgKind::List) => {
                    bail!("click_each needs a list parameter")
                }
                ScriptOp::FillTable | ScriptOp::FillRecords
                    if !self.params.contains(&ArgKind::Table) =>
                {
                    bail!("{:?} needs a table parameter", op)
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl ScriptOp {
    fn texts(&self) -> Vec<&str> {
        match self {
            ScriptOp::Navigate(url) => vec![url.as_str()],
            ScriptOp::Fill { element, text } | ScriptOp::ExpectEqual { element, text } => {
                vec![element.as_str(), text.as_str()]
            }
            ScriptOp::Click(element) | ScriptOp::SetCheckbox { element, .. } => {
                vec![element.as_str()]
            }
            ScriptOp::Press { key, element } => {
                let mut texts = vec![key.as_str()];
                texts.extend(element.as_deref());
                texts
            }
            ScriptOp::Select { element, option } => vec![element.as_str(), option.as_str()],
            ScriptOp::ClickEach(_) | ScriptOp::FillTable | ScriptOp::FillRecords => Vec::new(),
        }
    }
}

/// Replace `$n` with the n-th (1-based) argument, which must be a scalar.
pub fn substitute(text: &str, args: &[StepArg]) -> Result<String> {
    let mut failure = None;
    let replaced = POSITIONAL.replace_all(text, |caps: &regex::Captures<'_>| {
        let value = caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|idx| idx.checked_sub(1))
            .and_then(|idx| args.get(idx))
            .ok_or_else(|| anyhow!("no argument for {}", &caps[0]))
            .and_then(|arg| Ok(arg.as_scalar()?.to_string()));
        match value {
            Ok(value) => value,
            Err(err) => {
                failure.get_or_insert(err);
                String::new()
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

#[async_trait]
impl ActionHandler for ScriptedAction {
    async fn invoke(&self, scope: ActionScope<'_>, args: &[StepArg]) -> Result<()> {
        for op in &self.script {
            debug!(page = %scope.page.title, ?op, "script step");
            match op {
                ScriptOp::Navigate(url) => scope.facade.navigate(&substitute(url, args)?).await?,
                ScriptOp::Fill { element, text } => {
                    let element = scope.element(&substitute(element, args)?)?;
                    scope.facade.fill(&element, &substitute(text, args)?).await?;
                }
                ScriptOp::Click(element) => {
                    let element = scope.element(&substitute(element, args)?)?;
                    scope.facade.click(&element).await?;
                }
                ScriptOp::Press { key, element } => {
                    let key = substitute(key, args)?;
                    match element {
                        Some(title) => {
                            let element = scope.element(&substitute(title, args)?)?;
                            scope.facade.press(Some(&element), &key).await?;
                        }
                        None => scope.facade.press(None, &key).await?,
                    }
                }
                ScriptOp::Select { element, option } => {
                    let element = scope.element(&substitute(element, args)?)?;
                    scope.facade.select(&element, &substitute(option, args)?).await?;
                }
                ScriptOp::SetCheckbox { element, checked } => {
                    let element = scope.element(&substitute(element, args)?)?;
                    scope.facade.set_checkbox(&element, *checked).await?;
                }
                ScriptOp::ClickEach(_) => {
                    let titles = args
                        .iter()
                        .find_map(|arg| arg.as_list().ok())
                        .context("click_each needs a list argument")?;
                    for title in titles {
                        let element = scope.element(title)?;
                        scope.facade.click(&element).await?;
                    }
                }
                ScriptOp::FillTable => {
                    let table = args
                        .iter()
                        .find_map(|arg| arg.as_table().ok())
                        .context("fill_table needs a table argument")?;
                    for (idx, row) in table.raw().iter().enumerate() {
                        let [title, text] = row.as_slice() else {
                            return Err(ArgError::RowWidth {
                                row: idx + 1,
                                expected: 2,
                                actual: row.len(),
                            }
                            .into());
                        };
                        let element = scope.element(title)?;
                        scope.facade.fill(&element, text).await?;
                    }
                }
                ScriptOp::FillRecords => {
                    let table = args
                        .iter()
                        .find_map(|arg| arg.as_table().ok())
                        .context("fill_records needs a table argument")?;
                    for record in table.as_maps()? {
                        for (title, text) in record {
                            let element = scope.element(&title)?;
                            scope.facade.fill(&element, &text).await?;
                        }
                    }
                }
                ScriptOp::ExpectEqual { element, text } => {
                    let title = substitute(element, args)?;
                    let expected = substitute(text, args)?;
                    let element = scope.element(&title)?;
                    if !scope.facade.check_equality(&element, &expected).await? {
                        bail!("'{}' value is not equal with '{}'", title, expected);
                    }
                }
            }
        }
        Ok(())
    }
}

impl PagesFile {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse pages file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pages file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Turn every spec into a page definition the registry can index.
    pub fn definitions(&self) -> Result<Vec<PageDefinition>> {
        self.pages.iter().map(PageSpec::definition).collect()
    }
}

impl PageSpec {
    pub fn definition(&self) -> Result<PageDefinition> {
        let page_type = match &self.url {
            Some(url) => DeclaredPage::at(url.clone()),
            None => DeclaredPage::new(),
        };
        let mut definition = PageDefinition::new(self.title.clone(), Arc::new(page_type));
        for element in &self.elements {
            definition = definition.element(element.title.clone(), element.locator.clone());
        }
        for action in &self.actions {
            let handler = ScriptedAction::new(action.params.clone(), action.script.clone())
                .with_context(|| {
                    format!("invalid script for action '{}' on page '{}'", action.title, self.title)
                })?;
            definition = definition.action(action.title.clone(), &action.params, Arc::new(handler));
        }
        Ok(definition)
    }
}

/// Pages loaded from YAML, usable as a registry source.
pub struct YamlPages {
    definitions: Vec<PageDefinition>,
}

impl YamlPages {
    pub fn load(path: &Path) -> Result<Self> {
        let definitions = PagesFile::load(path)?.definitions()?;
        debug!(path = %path.display(), pages = definitions.len(), "loaded page definitions");
        Ok(Self { definitions })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(Self {
            definitions: PagesFile::from_yaml_str(content)?.definitions()?,
        })
    }
}

impl PageSource for YamlPages {
    fn pages(&self) -> Vec<PageDefinition> {
        self.definitions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefactory_core_types::DataTable;

    #[test]
    fn positional_arguments_are_substituted() {
        let args = vec![StepArg::scalar("admin"), StepArg::scalar("secret")];
        assert_eq!(substitute("$1:$2", &args).unwrap(), "admin:secret");
        assert_eq!(substitute("no refs", &[]).unwrap(), "no refs");
    }

    #[test]
    fn substitution_rejects_missing_or_non_scalar_arguments() {
        assert!(substitute("$2", &[StepArg::scalar("a")]).is_err());
        let table = StepArg::Table(DataTable::default());
        assert!(substitute("$1", &[table]).is_err());
    }

    #[test]
    fn script_validation_checks_parameter_references() {
        let fill = |text: &str| ScriptOp::Fill {
            element: "Username".into(),
            text: text.into(),
        };
        assert!(ScriptedAction::new(vec![ArgKind::Scalar], vec![fill("$1")]).is_ok());
        assert!(ScriptedAction::new(vec![], vec![fill("$1")]).is_err());
        assert!(ScriptedAction::new(vec![ArgKind::Table], vec![fill("$1")]).is_err());
        assert!(ScriptedAction::new(vec![], vec![ScriptOp::FillTable]).is_err());
        assert!(ScriptedAction::new(vec![ArgKind::List], vec![ScriptOp::FillRecords]).is_err());
    }

    #[test]
    fn parses_page_yaml() {
        let file = PagesFile::from_yaml_str(
            r##"
pages:
  - title: Login
    url: https://example.test/login
    elements:
      - { title: Username, locator: "#username" }
      - { title: Remember, locator: "id:remember" }
    actions:
      - title: submit
        params: [scalar]
        script:
          - fill: { element: Username, text: "$1" }
          - set_checkbox: { element: Remember }
          - press: { key: Enter }
          - click: Submit
"##,
        )
        .unwrap();
        let page = &file.pages[0];
        assert_eq!(page.elements[1].locator, Locator::id("remember"));
        assert_eq!(
            page.actions[0].script[1],
            ScriptOp::SetCheckbox {
                element: "Remember".into(),
                checked: true
            }
        );
        assert_eq!(page.actions[0].script[3], ScriptOp::Click("Submit".into()));
        assert_eq!(file.definitions().unwrap().len(), 1);
    }

    #[test]
    fn fixture_pages_load_every_script_op_form() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pages.yaml");
        let file = PagesFile::load(&path).unwrap();

        let login = &file.pages[0];
        assert_eq!(login.actions[0].script, vec![ScriptOp::Click("Submit".into())]);
        assert_eq!(login.actions[3].script, vec![ScriptOp::FillTable]);
        assert_eq!(login.actions[5].script, vec![ScriptOp::ClickEach("$list".into())]);
        assert_eq!(login.actions[6].script, vec![ScriptOp::FillRecords]);
        assert_eq!(
            file.pages[1].actions[0].script[2],
            ScriptOp::ExpectEqual {
                element: "Search".into(),
                text: "$1".into()
            }
        );
        assert_eq!(file.definitions().unwrap().len(), 2);
    }
}
