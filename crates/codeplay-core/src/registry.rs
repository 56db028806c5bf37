//! Language registry for the online compiler.
//!
//! The registry maps every supported language to the identifier the judge
//! service understands and to the starter program shown when the language is
//! selected. It is built once per process and shared read-only.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CodeplayError, Result};

// ============================================================================
// ServiceId
// ============================================================================

/// Opaque identifier the judge service uses to select a language runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a service id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric `language_id` sent on the judge wire, if the
    /// identifier is numeric.
    #[must_use]
    pub fn judge_id(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// LanguageOption
// ============================================================================

/// A language the user can pick in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOption {
    /// Name shown in the language picker.
    pub display_name: String,
    /// Identifier understood by the judge service.
    pub service_id: ServiceId,
}

impl LanguageOption {
    /// Creates a new language option.
    #[must_use]
    pub fn new(display_name: impl Into<String>, service_id: impl Into<ServiceId>) -> Self {
        Self {
            display_name: display_name.into(),
            service_id: service_id.into(),
        }
    }
}

// ============================================================================
// Built-in tables
// ============================================================================

/// Display name and service id of every built-in language, in picker order.
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("Python", "71"),
    ("C++", "54"),
    ("Java", "62"),
    ("C", "50"),
    ("JavaScript", "63"),
    ("Rust", "73"),
    ("Ruby", "72"),
    ("Go", "60"),
    ("PHP", "68"),
];

/// Starter program for every built-in language.
const BUILTIN_SNIPPETS: &[(&str, &str)] = &[
    (
        "71",
        r##"# Python Code
def greet(name):
    return f"Hello, {name}!"

name = input("Enter your name: ")
print(greet(name))"##,
    ),
    (
        "54",
        r##"// C++ Code
#include <iostream>
using namespace std;
int main() {
    string name;
    cout << "Enter your name: ";
    cin >> name;
    cout << "Hello, " << name << "!" << endl;
    return 0;
}"##,
    ),
    (
        "62",
        r##"// Java Code
import java.util.Scanner;
public class Main {
    public static void main(String[] args) {
        Scanner sc = new Scanner(System.in);
        System.out.print("Enter your name: ");
        String name = sc.nextLine();
        System.out.println("Hello, " + name + "!");
    }
}"##,
    ),
    (
        "50",
        r##"// C Code
#include <stdio.h>
int main() {
    char name[50];
    printf("Enter your name: ");
    scanf("%s", name);
    printf("Hello, %s!\n", name);
    return 0;
}"##,
    ),
    (
        "63",
        r##"// JavaScript Code
function greet(name) {
    return "Hello, " + name + "!";
}
console.log(greet("World"));"##,
    ),
    (
        "73",
        r##"// Rust Code
use std::io;
fn main() {
    let mut name = String::new();
    println!("Enter your name: ");
    io::stdin().read_line(&mut name).expect("Failed to read input");
    println!("Hello, {}!", name.trim());
}"##,
    ),
    (
        "72",
        r##"# Ruby Code
def greet(name)
  return "Hello, #{name}!"
end

puts greet("World")"##,
    ),
    (
        "60",
        r##"// Go Code
package main
import "fmt"
func main() {
    var name string
    fmt.Print("Enter your name: ")
    fmt.Scanln(&name)
    fmt.Println("Hello,", name)
}"##,
    ),
    (
        "68",
        r##"<?php
// PHP Code
function greet($name) {
    return "Hello, " . $name . "!";
}
echo greet("World");
?>"##,
    ),
];

static BUILTIN: OnceCell<Arc<LanguageRegistry>> = OnceCell::new();

// ============================================================================
// LanguageRegistry
// ============================================================================

/// Read-only catalog of languages and their starter programs.
///
/// Invariants, checked on construction:
/// - the catalog is non-empty and unique by service id
/// - every service id is numeric
/// - the default source table covers exactly the catalog's service ids
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageOption>,
    defaults: HashMap<ServiceId, String>,
}

impl LanguageRegistry {
    /// Builds a registry from a catalog and a default source table.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::CatalogMismatch` if any invariant is violated.
    pub fn new(
        languages: Vec<LanguageOption>,
        defaults: impl IntoIterator<Item = (ServiceId, String)>,
    ) -> Result<Self> {
        if languages.is_empty() {
            return Err(CodeplayError::catalog_mismatch("catalog is empty"));
        }

        let mut table = HashMap::new();
        for (id, source) in defaults {
            if table.insert(id.clone(), source).is_some() {
                return Err(CodeplayError::catalog_mismatch(format!(
                    "'{id}' has more than one default source"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(languages.len());
        for language in &languages {
            let id = &language.service_id;
            if !seen.insert(id) {
                return Err(CodeplayError::catalog_mismatch(format!(
                    "'{id}' appears more than once in the catalog"
                )));
            }
            if id.judge_id().is_none() {
                return Err(CodeplayError::catalog_mismatch(format!(
                    "'{id}' ({}) is not a numeric judge language id",
                    language.display_name
                )));
            }
            if !table.contains_key(id) {
                return Err(CodeplayError::catalog_mismatch(format!(
                    "'{id}' ({}) has no default source",
                    language.display_name
                )));
            }
        }

        if let Some(orphan) = table.keys().find(|id| !seen.contains(id)) {
            return Err(CodeplayError::catalog_mismatch(format!(
                "default source for '{orphan}' has no catalog entry"
            )));
        }

        debug!(languages = languages.len(), "Language registry built");

        Ok(Self {
            languages,
            defaults: table,
        })
    }

    /// Builds a registry from static `(name, id)` and `(id, source)` tables.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::CatalogMismatch` if any invariant is violated.
    pub fn from_tables(languages: &[(&str, &str)], snippets: &[(&str, &str)]) -> Result<Self> {
        Self::new(
            languages
                .iter()
                .map(|(name, id)| LanguageOption::new(*name, *id))
                .collect(),
            snippets
                .iter()
                .map(|(id, source)| (ServiceId::from(*id), (*source).to_string())),
        )
    }

    /// Returns the process-wide built-in registry, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::CatalogMismatch` if the built-in tables are
    /// inconsistent.
    pub fn builtin() -> Result<Arc<Self>> {
        BUILTIN
            .get_or_try_init(|| Self::from_tables(BUILTIN_LANGUAGES, BUILTIN_SNIPPETS).map(Arc::new))
            .map(Arc::clone)
    }

    /// Returns all languages in display order.
    #[must_use]
    pub fn list_languages(&self) -> &[LanguageOption] {
        &self.languages
    }

    /// Returns the language selected when a session opens.
    #[must_use]
    pub fn first(&self) -> &LanguageOption {
        // non-empty by construction
        &self.languages[0]
    }

    /// Looks up a language by its service id.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::UnknownLanguage` if the id is not in the catalog.
    pub fn language(&self, service_id: &str) -> Result<&LanguageOption> {
        self.languages
            .iter()
            .find(|language| language.service_id.as_str() == service_id)
            .ok_or_else(|| CodeplayError::unknown_language(service_id))
    }

    /// Returns the starter program for a language.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::UnknownLanguage` if the id is not in the catalog.
    pub fn default_source(&self, service_id: &str) -> Result<&str> {
        self.defaults
            .get(service_id)
            .map(String::as_str)
            .ok_or_else(|| CodeplayError::unknown_language(service_id))
    }

    /// Returns `true` if the id is in the catalog.
    #[must_use]
    pub fn contains(&self, service_id: &str) -> bool {
        self.defaults.contains_key(service_id)
    }
}
