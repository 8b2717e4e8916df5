//! Capability model
//!
//! Account types map to fixed-width capability bitmasks through a
//! static table. A route declares the bit it needs and authorization
//! is a single bitwise AND, so adding or reordering routes can never
//! silently shift which permission they check.

use serde::{Deserialize, Serialize};

/// A single named permission, one bit in a role's mask.
///
/// Bit positions are part of the stored data model and must not be
/// reordered.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum Capability {
    /// Register an activity item for one's own organization
    AddItem = 0,
    /// Register a school-wide basic item
    AddBasicItem = 1,
    /// Apply for credit on an item
    Apply = 2,
    /// Audit activity items added by organizations
    AuditAdded = 3,
    /// Audit basic-item credit applications
    AuditBasic = 4,
    /// View and manage branches of one's college
    CheckBranchInfo = 5,
    /// View one's own application records
    CheckRecord = 6,
    /// View student rosters
    CheckStudentInfo = 7,
    /// Create manager accounts
    CreateManager = 8,
    /// Create organizations
    CreateOrg = 9,
    /// Run item-level statistics
    ItemAnalysis = 10,
    /// Manage one's own account (password, profile)
    ManageSelf = 11,
    /// Bulk-import student accounts
    ImportStudent = 12,
}

impl Capability {
    /// All capabilities, in bit order.
    pub const ALL: [Capability; 13] = [
        Capability::AddItem,
        Capability::AddBasicItem,
        Capability::Apply,
        Capability::AuditAdded,
        Capability::AuditBasic,
        Capability::CheckBranchInfo,
        Capability::CheckRecord,
        Capability::CheckStudentInfo,
        Capability::CreateManager,
        Capability::CreateOrg,
        Capability::ItemAnalysis,
        Capability::ManageSelf,
        Capability::ImportStudent,
    ];

    /// The mask with only this capability's bit set.
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::AddItem => write!(f, "add_item"),
            Capability::AddBasicItem => write!(f, "add_basic_item"),
            Capability::Apply => write!(f, "apply"),
            Capability::AuditAdded => write!(f, "audit_added"),
            Capability::AuditBasic => write!(f, "audit_basic"),
            Capability::CheckBranchInfo => write!(f, "check_branch_info"),
            Capability::CheckRecord => write!(f, "check_record"),
            Capability::CheckStudentInfo => write!(f, "check_student_info"),
            Capability::CreateManager => write!(f, "create_manager"),
            Capability::CreateOrg => write!(f, "create_org"),
            Capability::ItemAnalysis => write!(f, "item_analysis"),
            Capability::ManageSelf => write!(f, "manage_self"),
            Capability::ImportStudent => write!(f, "import_student"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add_item" => Ok(Capability::AddItem),
            "add_basic_item" => Ok(Capability::AddBasicItem),
            "apply" => Ok(Capability::Apply),
            "audit_added" => Ok(Capability::AuditAdded),
            "audit_basic" => Ok(Capability::AuditBasic),
            "check_branch_info" => Ok(Capability::CheckBranchInfo),
            "check_record" => Ok(Capability::CheckRecord),
            "check_student_info" => Ok(Capability::CheckStudentInfo),
            "create_manager" => Ok(Capability::CreateManager),
            "create_org" => Ok(Capability::CreateOrg),
            "item_analysis" => Ok(Capability::ItemAnalysis),
            "manage_self" => Ok(Capability::ManageSelf),
            "import_student" => Ok(Capability::ImportStudent),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// A fixed-width set of capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    /// Build a set from a list of capabilities.
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    pub const fn from_bits(bits: u16) -> Self {
        CapabilitySet(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Membership check: one bitwise AND.
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn contains_any(self, other: CapabilitySet) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the capabilities present in this set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }

    /// Capability names present in this set, for wire responses and logs.
    pub fn names(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#015b}", self.0)
    }
}

/// Account type classification for the organizational hierarchy.
///
/// Codes are stored in the principal directory and must stay stable.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccountType {
    SuperAdmin = 0,
    SchoolAdmin = 1,
    UnitAdmin = 2,
    CollegeAdmin = 3,
    BranchAdmin = 4,
    Student = 5,
}

impl AccountType {
    pub const ALL: [AccountType; 6] = [
        AccountType::SuperAdmin,
        AccountType::SchoolAdmin,
        AccountType::UnitAdmin,
        AccountType::CollegeAdmin,
        AccountType::BranchAdmin,
        AccountType::Student,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<AccountType> {
        match code {
            0 => Some(AccountType::SuperAdmin),
            1 => Some(AccountType::SchoolAdmin),
            2 => Some(AccountType::UnitAdmin),
            3 => Some(AccountType::CollegeAdmin),
            4 => Some(AccountType::BranchAdmin),
            5 => Some(AccountType::Student),
            _ => None,
        }
    }

    /// The static capability table. Total over all account types and
    /// immutable at run time.
    pub const fn capabilities(self) -> CapabilitySet {
        use Capability::*;
        match self {
            AccountType::SuperAdmin => CapabilitySet::of(&[
                AddBasicItem,
                AuditAdded,
                AuditBasic,
                CheckStudentInfo,
                CreateManager,
                CreateOrg,
                ItemAnalysis,
                ManageSelf,
            ]),
            AccountType::SchoolAdmin => CapabilitySet::of(&[
                AuditAdded,
                AuditBasic,
                CheckStudentInfo,
                CreateManager,
                CreateOrg,
                ItemAnalysis,
                ManageSelf,
            ]),
            AccountType::UnitAdmin => CapabilitySet::of(&[AddItem, ManageSelf]),
            AccountType::CollegeAdmin => CapabilitySet::of(&[
                AddItem,
                AuditBasic,
                CheckBranchInfo,
                CheckStudentInfo,
                ManageSelf,
            ]),
            AccountType::BranchAdmin => CapabilitySet::of(&[
                AuditBasic,
                CheckStudentInfo,
                ManageSelf,
                ImportStudent,
            ]),
            AccountType::Student => CapabilitySet::of(&[Apply, CheckRecord, ManageSelf]),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::SuperAdmin => write!(f, "super_admin"),
            AccountType::SchoolAdmin => write!(f, "school_admin"),
            AccountType::UnitAdmin => write!(f, "unit_admin"),
            AccountType::CollegeAdmin => write!(f, "college_admin"),
            AccountType::BranchAdmin => write!(f, "branch_admin"),
            AccountType::Student => write!(f, "student"),
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(AccountType::SuperAdmin),
            "school_admin" => Ok(AccountType::SchoolAdmin),
            "unit_admin" => Ok(AccountType::UnitAdmin),
            "college_admin" => Ok(AccountType::CollegeAdmin),
            "branch_admin" => Ok(AccountType::BranchAdmin),
            "student" => Ok(AccountType::Student),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// Resolve the capability mask for a raw role code.
///
/// Returns `None` for codes outside the account-type table; callers
/// must treat that as a denial, never a panic.
pub const fn capabilities_for(code: u8) -> Option<CapabilitySet> {
    match AccountType::from_code(code) {
        Some(account) => Some(account.capabilities()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total_over_valid_codes() {
        for code in 0..6u8 {
            assert!(capabilities_for(code).is_some(), "code {} missing", code);
        }
    }

    #[test]
    fn masks_match_documented_table() {
        assert_eq!(
            AccountType::SuperAdmin.capabilities().bits(),
            0b0111110011010
        );
        assert_eq!(
            AccountType::SchoolAdmin.capabilities().bits(),
            0b0111110011000
        );
        assert_eq!(AccountType::UnitAdmin.capabilities().bits(), 0b0100000000001);
        assert_eq!(
            AccountType::CollegeAdmin.capabilities().bits(),
            0b0100010110001
        );
        assert_eq!(
            AccountType::BranchAdmin.capabilities().bits(),
            0b1100010010000
        );
        assert_eq!(AccountType::Student.capabilities().bits(), 0b0100001000100);
    }

    #[test]
    fn unknown_codes_resolve_to_none() {
        for code in [6u8, 7, 42, 255] {
            assert!(capabilities_for(code).is_none());
        }
    }

    #[test]
    fn branch_admin_cannot_create_managers_but_super_admin_can() {
        let branch = AccountType::BranchAdmin.capabilities();
        let superadmin = AccountType::SuperAdmin.capabilities();
        assert!(!branch.contains(Capability::CreateManager));
        assert!(superadmin.contains(Capability::CreateManager));
    }

    #[test]
    fn every_role_can_manage_itself() {
        for account in AccountType::ALL {
            assert!(
                account.capabilities().contains(Capability::ManageSelf),
                "{} lost manage_self",
                account
            );
        }
    }

    #[test]
    fn capability_names_round_trip() {
        for capability in Capability::ALL {
            let name = capability.to_string();
            assert_eq!(name.parse::<Capability>().unwrap(), capability);
        }
    }

    #[test]
    fn set_iteration_follows_bit_order() {
        let set = CapabilitySet::of(&[Capability::ManageSelf, Capability::Apply]);
        let collected: Vec<_> = set.iter().collect();
        assert_eq!(collected, vec![Capability::Apply, Capability::ManageSelf]);
    }
}
