// security/src/caller.rs

use uuid::Uuid;

use models::{Account, DoctorProfile, HmsResult, PatientProfile, ReceptionistProfile, Role};
use storage::HmsStore;

/// The capability context of an authenticated request, resolved once per
/// request and passed down explicitly. Each non-admin variant carries the
/// role profile when one exists; a missing profile is represented as `None`
/// and interpreted per-action by the access layer (hard error on create,
/// empty scope on list).
#[derive(Debug, Clone)]
pub enum Caller {
    Admin { account: Account },
    Doctor { account: Account, profile: Option<DoctorProfile> },
    Patient { account: Account, profile: Option<PatientProfile> },
    Receptionist { account: Account, profile: Option<ReceptionistProfile> },
}

impl Caller {
    /// Looks up the account by token subject and attaches the profile for
    /// its role. Returns `None` when the account no longer exists.
    pub async fn resolve(store: &dyn HmsStore, username: &str) -> HmsResult<Option<Caller>> {
        let Some(account) = store.get_account_by_username(username).await? else {
            return Ok(None);
        };
        let caller = match account.role {
            Role::Admin => Caller::Admin { account },
            Role::Doctor => {
                let profile = store.get_doctor_by_account(account.id).await?;
                Caller::Doctor { account, profile }
            }
            Role::Patient => {
                let profile = store.get_patient_profile(account.id).await?;
                Caller::Patient { account, profile }
            }
            Role::Receptionist => {
                let profile = store.get_receptionist_by_account(account.id).await?;
                Caller::Receptionist { account, profile }
            }
        };
        Ok(Some(caller))
    }

    pub fn account(&self) -> &Account {
        match self {
            Caller::Admin { account }
            | Caller::Doctor { account, .. }
            | Caller::Patient { account, .. }
            | Caller::Receptionist { account, .. } => account,
        }
    }

    pub fn role(&self) -> Role {
        self.account().role
    }

    /// The caller's patient id, when the caller is a patient with a profile.
    pub fn patient_id(&self) -> Option<Uuid> {
        match self {
            Caller::Patient { profile: Some(p), .. } => Some(p.account_id),
            _ => None,
        }
    }

    /// The caller's doctor id, when the caller is a doctor with a profile.
    pub fn doctor_id(&self) -> Option<u32> {
        match self {
            Caller::Doctor { profile: Some(d), .. } => Some(d.id),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Caller::Admin { .. } | Caller::Receptionist { .. })
    }
}
