//! Render model for the user edit form.

use crate::model::ids::{DivisionId, OuId, UserId};
use crate::model::role::Role;
use crate::model::user::EditableUser;
use crate::taxonomy::TaxonomyIndex;
use std::fmt::{Display, Formatter};

/// One entry of the role selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOption {
    pub role: Role,
    pub selected: bool,
}

/// One labelled division checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxView {
    pub division_id: DivisionId,
    pub ou_id: OuId,
    pub label: String,
    pub checked: bool,
}

/// Divisions of one OU under its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub ou_id: OuId,
    pub header: String,
    pub checkboxes: Vec<CheckboxView>,
}

/// Everything a host needs to draw the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub user_id: UserId,
    pub username: String,
    pub role_options: Vec<RoleOption>,
    pub groups: Vec<GroupView>,
    /// `false` while a submission is outstanding.
    pub submit_enabled: bool,
}

impl FormView {
    pub fn build(user: &EditableUser, index: &TaxonomyIndex, submit_enabled: bool) -> Self {
        let role_options = Role::ALL
            .into_iter()
            .map(|role| RoleOption {
                role,
                selected: role == user.role,
            })
            .collect();
        let groups = index
            .groups()
            .map(|group| GroupView {
                ou_id: group.ou().id.clone(),
                header: group.ou().name.clone(),
                checkboxes: group
                    .divisions()
                    .iter()
                    .map(|division| CheckboxView {
                        division_id: division.id.clone(),
                        ou_id: group.ou().id.clone(),
                        label: division.name.clone(),
                        checked: user.membership.has_division(&division.id),
                    })
                    .collect(),
            })
            .collect();

        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role_options,
            groups,
            submit_enabled,
        }
    }

    pub fn selected_role(&self) -> Option<Role> {
        self.role_options
            .iter()
            .find(|option| option.selected)
            .map(|option| option.role)
    }

    pub fn checkbox(&self, division: &DivisionId) -> Option<&CheckboxView> {
        self.groups
            .iter()
            .flat_map(|group| group.checkboxes.iter())
            .find(|checkbox| &checkbox.division_id == division)
    }
}

impl Display for FormView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Update User")?;
        writeln!(f, "{}", self.username)?;
        let roles = self
            .role_options
            .iter()
            .map(|option| {
                if option.selected {
                    format!("({})", option.role)
                } else {
                    option.role.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "role: {roles}")?;
        for group in &self.groups {
            writeln!(f, "## {}", group.header)?;
            for checkbox in &group.checkboxes {
                let mark = if checkbox.checked { 'x' } else { ' ' };
                writeln!(
                    f,
                    "  [{mark}] {} ({}:{})",
                    checkbox.label, checkbox.division_id, checkbox.ou_id
                )?;
            }
        }
        let action = if self.submit_enabled {
            "[Update]"
        } else {
            "[Updating...]"
        };
        write!(f, "{action}")
    }
}
