//! The public façade (spec.md §6): a named handle over a shared
//! [`Group`], composing the lexer/parser/executor into the handful of
//! operations an embedding application actually calls.

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::exec::Executor;
use crate::funcs::FuncMap;
use crate::group::Group;
use crate::sink::Sink;
use crate::value::Value;

const DEFAULT_LEFT_DELIM: &str = "{{";
const DEFAULT_RIGHT_DELIM: &str = "}}";

/// A named view onto a template group. Cloning the group (cheap, an
/// `Arc` bump) via [`Template::create_with_parent`] is how sibling
/// templates are built so they can invoke each other by name.
#[derive(Clone)]
pub struct Template {
    name: String,
    left_delim: String,
    right_delim: String,
    group: Arc<Group>,
}

impl Template {
    /// Fresh handle over an empty group.
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            left_delim: DEFAULT_LEFT_DELIM.to_string(),
            right_delim: DEFAULT_RIGHT_DELIM.to_string(),
            group: Arc::new(Group::new()),
        }
    }

    /// A new handle sharing `parent`'s group and delimiter pair — used
    /// to define sub-templates that can invoke each other via
    /// `{{template}}`.
    pub fn create_with_parent(name: impl Into<String>, parent: &Template) -> Self {
        Self {
            name: name.into(),
            left_delim: parent.left_delim.clone(),
            right_delim: parent.right_delim.clone(),
            group: Arc::clone(&parent.group),
        }
    }

    /// `left`/`right` of `None` revert that delimiter to the default.
    pub fn set_delimiters(&mut self, left: Option<&str>, right: Option<&str>) {
        self.left_delim = left.unwrap_or(DEFAULT_LEFT_DELIM).to_string();
        self.right_delim = right.unwrap_or(DEFAULT_RIGHT_DELIM).to_string();
    }

    pub fn add_functions(&self, funcs: FuncMap) {
        self.group.add_functions(funcs);
    }

    /// Parse `text` into this handle's own named tree (plus one
    /// additional tree per nested `{{define}}` it contains), adding
    /// all of them to the shared group.
    pub fn parse(&mut self, text: &str) -> Result<(), Error> {
        let name = self.name.clone();
        self.parse_named(&name, text)
    }

    fn parse_named(&self, name: &str, text: &str) -> Result<(), Error> {
        let group = &self.group;
        let known_funcs = |f: &str| group.is_known_func(f);
        let trees = crate::parse::parse(text, name, name, &self.left_delim, &self.right_delim, &known_funcs);
        match trees {
            Ok(trees) => {
                for tree in trees {
                    tracing::debug!(template = %tree.name, "parsed template");
                    self.group.insert(tree);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "template parse failed");
                Err(e)
            }
        }
    }

    /// Bulk-parse several named sources; if this handle's name isn't
    /// yet a known template after parsing, the first key becomes the
    /// root template.
    pub fn parse_inputs(&mut self, funcs: FuncMap, inputs: &[(&str, &str)]) -> Result<(), Error> {
        self.group.add_functions(funcs);
        let mut first: Option<String> = None;
        for (name, text) in inputs {
            first.get_or_insert_with(|| name.to_string());
            self.parse_named(name, text)?;
        }
        if !self.group.contains(&self.name) {
            if let Some(first_name) = first {
                self.name = first_name;
            }
        }
        Ok(())
    }

    /// Bulk-parse a list of files, one template per file, named after
    /// the file's stem (`greeting.tmpl` -> `"greeting"`).
    pub fn parse_files<P: AsRef<Path>>(&mut self, funcs: FuncMap, files: &[P]) -> Result<(), Error> {
        let mut inputs = Vec::with_capacity(files.len());
        let mut texts = Vec::with_capacity(files.len());
        for path in files {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|e| Error::internal(format!("reading {}: {e}", path.display())))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            texts.push((name, text));
        }
        for (name, text) in &texts {
            inputs.push((name.as_str(), text.as_str()));
        }
        self.parse_inputs(funcs, &inputs)
    }

    /// Render this handle's own named template against `data`.
    pub fn execute(&self, sink: &mut dyn Sink, data: Value) -> Result<(), Error> {
        self.execute_template(sink, &self.name, data)
    }

    /// Render a sibling template, named `name`, from the same group.
    pub fn execute_template(&self, sink: &mut dyn Sink, name: &str, data: Value) -> Result<(), Error> {
        let trees = self.group.snapshot();
        let funcs = self.group.func_table();
        let result = Executor::new(&trees, &funcs).execute(sink, name, data);
        match &result {
            Ok(()) => tracing::debug!(template = name, "executed template"),
            Err(e) => tracing::warn!(template = name, error = %e, "template execution failed"),
        }
        result
    }

    /// Look up a sibling template by name without executing it.
    pub fn get_template(&self, name: &str) -> Option<Template> {
        if self.group.contains(name) {
            Some(Template {
                name: name.to_string(),
                left_delim: self.left_delim.clone(),
                right_delim: self.right_delim.clone(),
                group: Arc::clone(&self.group),
            })
        } else {
            None
        }
    }

    /// Every template name currently defined in this handle's group.
    pub fn get_templates(&self) -> Vec<Template> {
        self.group
            .names()
            .into_iter()
            .map(|name| Template {
                name,
                left_delim: self.left_delim.clone(),
                right_delim: self.right_delim.clone(),
                group: Arc::clone(&self.group),
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
