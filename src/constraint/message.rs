//! Message templates.

use std::sync::Arc;

use crate::group::{Group, GroupSet};

/// Where a message template applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageScope {
    Any,
    Group(Group),
    Locale(Arc<str>),
}

/// Template overrides for one constraint.
///
/// Resolution prefers a template for an active group, then one for the
/// run's locale, then an unscoped one. With none of those the kind's own
/// message is kept.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    templates: Vec<(MessageScope, String)>,
}

impl Messages {
    pub(crate) fn push(&mut self, scope: MessageScope, template: impl Into<String>) {
        let template = template.into();
        match self.templates.iter_mut().find(|(s, _)| *s == scope) {
            Some(existing) => existing.1 = template,
            None => self.templates.push((scope, template)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn resolve(&self, groups: &GroupSet, locale: Option<&str>) -> Option<&str> {
        let by_group = self.templates.iter().find(|(scope, _)| match scope {
            MessageScope::Group(group) => {
                groups.contains(group) || (groups.is_empty() && *group == Group::Default)
            }
            _ => false,
        });
        let by_locale = || {
            self.templates.iter().find(|(scope, _)| match (scope, locale) {
                (MessageScope::Locale(tag), Some(active)) => tag.eq_ignore_ascii_case(active),
                _ => false,
            })
        };
        let any = || {
            self.templates
                .iter()
                .find(|(scope, _)| *scope == MessageScope::Any)
        };

        by_group
            .or_else(by_locale)
            .or_else(any)
            .map(|(_, template)| template.as_str())
    }
}

/// Substitutes `{name}` placeholders; unknown placeholders are left as-is.
pub(crate) fn render(template: &str, params: &[(&'static str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}
