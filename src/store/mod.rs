use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::ClientOptions,
    Client, Collection, Database,
};
use tracing::{info, warn};

use crate::config::Settings;

mod pipeline;
mod records;

pub use pipeline::{profile_pipeline, LookupStage, EMPLOYEE_ID_FIELD, RELATED_ID_FIELD};
pub use records::{
    CreateProfileRequest, DepartmentRecord, DeveloperRecord, EmployeeProfile, EmployeeRecord,
    TesterRecord, UpdateProfileRequest,
};

/// Collection holding the core employee records.
pub const EMPLOYEE: &str = "Employee";
/// Collection holding department memberships.
pub const DEPARTMENT: &str = "Department";
/// Collection holding developer roles.
pub const DEVELOPER: &str = "Developer";
/// Collection holding tester roles.
pub const TESTER: &str = "Tester";

/// Outcome of one write in a cascade fan-out.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionOutcome {
    /// Name of the collection the write targeted
    pub collection: &'static str,
    /// Error text if the write failed, `None` on success
    pub error: Option<String>,
}

/// Per-collection outcomes of a cascade create or delete.
///
/// The four collections are written independently with no transaction and
/// no rollback. Instead of discarding individual failures, every outcome is
/// recorded here so the caller can see exactly which collections were left
/// behind by a partial cascade.
///
/// ## Example
/// ```rust
/// use rust_profile_db::store::CascadeReport;
///
/// let mut report = CascadeReport::new();
/// report.push::<(), String>("Employee", Ok(()));
/// report.push::<(), String>("Department", Err("write failed".to_string()));
/// assert!(!report.is_complete());
/// assert_eq!(report.failures().count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CascadeReport {
    outcomes: Vec<CollectionOutcome>,
}

impl CascadeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one write outcome, logging failures as they land.
    ///
    /// Failures are demoted to warnings here because a cascade keeps going
    /// regardless; the caller decides what to tell the user from the
    /// finished report.
    pub fn push<T, E: std::fmt::Display>(
        &mut self,
        collection: &'static str,
        result: Result<T, E>,
    ) {
        let error = match result {
            Ok(_) => None,
            Err(e) => {
                warn!(collection, error = %e, "cascade write failed");
                Some(e.to_string())
            }
        };
        self.outcomes.push(CollectionOutcome { collection, error });
    }

    /// True when every write in the cascade succeeded.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    /// Outcomes that failed, in cascade order.
    pub fn failures(&self) -> impl Iterator<Item = &CollectionOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// All outcomes, in cascade order.
    pub fn outcomes(&self) -> &[CollectionOutcome] {
        &self.outcomes
    }
}

/// Typed facade over the four profile collections.
///
/// The store is opened once at startup and passed by reference to every
/// caller; dropping it (via [`ProfileStore::close`]) releases the client.
/// There is no shared mutable state inside the process - the only shared
/// resource is the remote collection set, which is not locked, so external
/// writers can race a cascade. That is an accepted weakness of the scheme.
///
/// ## Operations
///
/// | Operation | Collections touched | Failure handling |
/// |-----------|--------------------|------------------|
/// | [`create_profile`](Self::create_profile) | all four, insert | per-collection report |
/// | [`update_profile`](Self::update_profile) | `Employee` only | error aborts the operation |
/// | [`delete_profile`](Self::delete_profile) | all four, delete | per-collection report |
/// | [`read_profiles_joined`](Self::read_profiles_joined) | `Employee` + lookups | error aborts the operation |
pub struct ProfileStore {
    client: Client,
    db: Database,
}

impl ProfileStore {
    /// Connects to MongoDB and verifies the server responds to a ping.
    ///
    /// Connect and server-selection waits are bounded by the configured
    /// timeout, so a dead server fails the call instead of hanging. A
    /// connection or ping failure here is fatal to the process.
    ///
    /// ## Arguments
    /// * `settings` - Resolved URI, database name, and timeout
    ///
    /// ## Returns
    /// * `Ok(ProfileStore)` - Connected and pinged successfully
    /// * `Err(_)` - Malformed URI, unreachable server, or failed ping
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let mut options = ClientOptions::parse(&settings.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(settings.timeout);
        options.server_selection_timeout = Some(settings.timeout);

        let client = Client::with_options(options)?;
        let db = client.database(&settings.database);

        // Fail fast if the server is unreachable rather than on first use.
        db.run_command(doc! { "ping": 1 }, None).await?;
        info!(database = %settings.database, "connected to MongoDB");

        Ok(Self { client, db })
    }

    /// Inserts one record into each of the four collections.
    ///
    /// The four inserts are independent: no ordering guarantee, no
    /// uniqueness check on the employee id (duplicates silently coexist),
    /// and no rollback when one insert fails while others succeed. Each
    /// outcome is captured in the returned report.
    ///
    /// ## Arguments
    /// * `req` - Field values for the employee and its three related records
    ///
    /// ## Returns
    /// The per-collection [`CascadeReport`]; inspect
    /// [`CascadeReport::is_complete`] to tell whether the profile landed
    /// fully.
    pub async fn create_profile(&self, req: &CreateProfileRequest) -> CascadeReport {
        let (employee, department, developer, tester) = req.records();

        let mut report = CascadeReport::new();
        report.push(EMPLOYEE, self.employees().insert_one(&employee, None).await);
        report.push(
            DEPARTMENT,
            self.departments().insert_one(&department, None).await,
        );
        report.push(
            DEVELOPER,
            self.developers().insert_one(&developer, None).await,
        );
        report.push(TESTER, self.testers().insert_one(&tester, None).await);

        if report.is_complete() {
            info!(emp_id = req.emp_id, "profile created");
        }
        report
    }

    /// Replaces name and salary on the employee record with the given id.
    ///
    /// Related Department/Developer/Tester records are untouched. A missing
    /// employee id is a no-op, not an error; the returned matched count is
    /// `0` in that case.
    ///
    /// ## Returns
    /// * `Ok(matched)` - Number of employee records the filter matched
    /// * `Err(_)` - Transport or server failure (the operation aborts)
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<u64> {
        let filter = doc! { EMPLOYEE_ID_FIELD: req.emp_id };
        let update = doc! { "$set": { "name": req.name.as_str(), "salary": req.salary } };
        let result = self.employees().update_one(filter, update, None).await?;
        info!(
            emp_id = req.emp_id,
            matched = result.matched_count,
            "profile updated"
        );
        Ok(result.matched_count)
    }

    /// Best-effort cascade delete of one profile across all four collections.
    ///
    /// Each collection gets an independent delete keyed on the employee id
    /// (`id` for `Employee`, `emp_id` for the rest). A collection with no
    /// matching record is not an error, which makes a repeated delete a
    /// no-op; no transaction spans the four deletes, so an interruption
    /// mid-sequence leaves a partial profile behind.
    ///
    /// ## Returns
    /// The per-collection [`CascadeReport`] of delete outcomes.
    pub async fn delete_profile(&self, emp_id: i64) -> CascadeReport {
        let mut report = CascadeReport::new();
        report.push(
            EMPLOYEE,
            self.employees()
                .delete_one(doc! { EMPLOYEE_ID_FIELD: emp_id }, None)
                .await,
        );
        report.push(
            DEPARTMENT,
            self.departments()
                .delete_one(doc! { RELATED_ID_FIELD: emp_id }, None)
                .await,
        );
        report.push(
            DEVELOPER,
            self.developers()
                .delete_one(doc! { RELATED_ID_FIELD: emp_id }, None)
                .await,
        );
        report.push(
            TESTER,
            self.testers()
                .delete_one(doc! { RELATED_ID_FIELD: emp_id }, None)
                .await,
        );

        if report.is_complete() {
            info!(emp_id, "profile deleted");
        }
        report
    }

    /// Reads the joined profile view for every employee.
    ///
    /// Runs the fixed three-stage `$lookup` pipeline server-side against
    /// the `Employee` collection; each employee comes back with whatever
    /// Department/Developer/Tester records share its id, in no guaranteed
    /// order. Re-running reflects the current store state.
    ///
    /// A document that fails to decode is skipped with a warning rather
    /// than aborting the whole read, matching the tolerant read behavior of
    /// the rest of the store.
    pub async fn read_profiles_joined(&self) -> Result<Vec<EmployeeProfile>> {
        let mut cursor = self
            .employees()
            .aggregate(profile_pipeline(), None)
            .await?;

        let mut profiles = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            match bson::from_document::<EmployeeProfile>(doc) {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!(error = %e, "skipping profile document that failed to decode"),
            }
        }
        Ok(profiles)
    }

    /// Drops the four collections and reloads the bundled sample data.
    ///
    /// Destructive: any existing records are removed first. Used by the
    /// `--seed` startup flag to give the menu something to show.
    pub async fn load_sample_data(&self) -> Result<()> {
        self.employees().drop(None).await?;
        self.departments().drop(None).await?;
        self.developers().drop(None).await?;
        self.testers().drop(None).await?;

        self.employees()
            .insert_many(sample_employees(), None)
            .await?;
        self.departments()
            .insert_many(sample_departments(), None)
            .await?;
        self.developers()
            .insert_many(sample_developers(), None)
            .await?;
        self.testers().insert_many(sample_testers(), None).await?;

        info!("sample data loaded");
        Ok(())
    }

    /// Shuts down the client, releasing pooled connections.
    pub async fn close(self) {
        self.client.shutdown().await;
        info!("disconnected from MongoDB");
    }

    fn employees(&self) -> Collection<EmployeeRecord> {
        self.db.collection(EMPLOYEE)
    }

    fn departments(&self) -> Collection<DepartmentRecord> {
        self.db.collection(DEPARTMENT)
    }

    fn developers(&self) -> Collection<DeveloperRecord> {
        self.db.collection(DEVELOPER)
    }

    fn testers(&self) -> Collection<TesterRecord> {
        self.db.collection(TESTER)
    }
}

/// Sample employees used by [`ProfileStore::load_sample_data`].
fn sample_employees() -> Vec<EmployeeRecord> {
    vec![
        EmployeeRecord {
            emp_id: 1,
            name: "Alice".to_string(),
            salary: 50000.0,
        },
        EmployeeRecord {
            emp_id: 2,
            name: "Bob".to_string(),
            salary: 60000.0,
        },
        EmployeeRecord {
            emp_id: 3,
            name: "Charlie".to_string(),
            salary: 55000.0,
        },
    ]
}

fn sample_departments() -> Vec<DepartmentRecord> {
    vec![
        DepartmentRecord {
            name: "IT".to_string(),
            emp_id: 1,
        },
        DepartmentRecord {
            name: "HR".to_string(),
            emp_id: 2,
        },
        DepartmentRecord {
            name: "Finance".to_string(),
            emp_id: 3,
        },
    ]
}

fn sample_developers() -> Vec<DeveloperRecord> {
    vec![
        DeveloperRecord {
            language: "Go".to_string(),
            emp_id: 1,
        },
        DeveloperRecord {
            language: "Python".to_string(),
            emp_id: 2,
        },
        DeveloperRecord {
            language: "Java".to_string(),
            emp_id: 3,
        },
    ]
}

fn sample_testers() -> Vec<TesterRecord> {
    vec![
        TesterRecord {
            language: "JavaScript".to_string(),
            emp_id: 1,
        },
        TesterRecord {
            language: "Ruby".to_string(),
            emp_id: 2,
        },
        TesterRecord {
            language: "C#".to_string(),
            emp_id: 3,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_complete() {
        assert!(CascadeReport::new().is_complete());
    }

    #[test]
    fn report_tracks_failures_in_cascade_order() {
        let mut report = CascadeReport::new();
        report.push::<(), String>(EMPLOYEE, Ok(()));
        report.push::<(), String>(DEPARTMENT, Err("no quorum".to_string()));
        report.push::<(), String>(DEVELOPER, Ok(()));
        report.push::<(), String>(TESTER, Err("timed out".to_string()));

        assert!(!report.is_complete());
        let failed: Vec<&str> = report.failures().map(|o| o.collection).collect();
        assert_eq!(failed, vec![DEPARTMENT, TESTER]);
        assert_eq!(report.outcomes().len(), 4);
    }

    #[test]
    fn report_with_only_successes_is_complete() {
        let mut report = CascadeReport::new();
        for coll in [EMPLOYEE, DEPARTMENT, DEVELOPER, TESTER] {
            report.push::<(), String>(coll, Ok(()));
        }
        assert!(report.is_complete());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn sample_data_covers_every_collection_for_each_employee() {
        let employees = sample_employees();
        for emp in &employees {
            assert!(sample_departments().iter().any(|d| d.emp_id == emp.emp_id));
            assert!(sample_developers().iter().any(|d| d.emp_id == emp.emp_id));
            assert!(sample_testers().iter().any(|t| t.emp_id == emp.emp_id));
        }
        assert_eq!(employees.len(), 3);
    }
}
