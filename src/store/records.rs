use serde::{Deserialize, Serialize};

/// Core employee record, one per profile.
///
/// Identity is the employee id; it is stored under the bson key `id` in the
/// `Employee` collection, while the related collections key their copies
/// under `emp_id`. The join pipeline bridges the two names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(rename = "id")]
    pub emp_id: i64,
    pub name: String,
    pub salary: f64,
}

/// Department membership for one employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub name: String,
    pub emp_id: i64,
}

/// Developer role (programming language) for one employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeveloperRecord {
    pub language: String,
    pub emp_id: i64,
}

/// Tester role (programming language) for one employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TesterRecord {
    pub language: String,
    pub emp_id: i64,
}

/// Read-side aggregate produced by the `$lookup` join; never persisted.
///
/// The three sub-sequences carry whatever records share the employee id, in
/// no guaranteed order. The bson field names match the `as` outputs of the
/// pipeline stages in [`super::pipeline::profile_pipeline`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(rename = "id")]
    pub emp_id: i64,
    pub name: String,
    pub salary: f64,
    #[serde(rename = "department_info")]
    pub departments: Vec<DepartmentRecord>,
    #[serde(rename = "developer_info")]
    pub developers: Vec<DeveloperRecord>,
    #[serde(rename = "tester_info")]
    pub testers: Vec<TesterRecord>,
}

/// Everything needed to create one profile across the four collections.
///
/// Callers (the menu, tests, any future API) populate this request instead
/// of the store reading a terminal itself. The employee id is stamped into
/// the three related records when the request is split into records.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateProfileRequest {
    pub emp_id: i64,
    pub name: String,
    pub salary: f64,
    pub department: String,
    pub developer_language: String,
    pub tester_language: String,
}

impl CreateProfileRequest {
    /// Splits the request into the four records to be inserted.
    ///
    /// Each related record carries the request's employee id, so the four
    /// writes always agree on the join key even though they are independent.
    pub fn records(
        &self,
    ) -> (
        EmployeeRecord,
        DepartmentRecord,
        DeveloperRecord,
        TesterRecord,
    ) {
        (
            EmployeeRecord {
                emp_id: self.emp_id,
                name: self.name.clone(),
                salary: self.salary,
            },
            DepartmentRecord {
                name: self.department.clone(),
                emp_id: self.emp_id,
            },
            DeveloperRecord {
                language: self.developer_language.clone(),
                emp_id: self.emp_id,
            },
            TesterRecord {
                language: self.tester_language.clone(),
                emp_id: self.emp_id,
            },
        )
    }
}

/// Replacement values for the core fields of an existing profile.
///
/// Only name and salary on the `Employee` record are touched; the related
/// Department/Developer/Tester records are out of scope for update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateProfileRequest {
    pub emp_id: i64,
    pub name: String,
    pub salary: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn employee_record_uses_id_on_the_wire() {
        let emp = EmployeeRecord {
            emp_id: 1,
            name: "Alice".to_string(),
            salary: 50000.0,
        };
        let d = bson::to_document(&emp).unwrap();
        assert_eq!(d, doc! { "id": 1_i64, "name": "Alice", "salary": 50000.0 });
    }

    #[test]
    fn related_records_use_emp_id_on_the_wire() {
        let dept = DepartmentRecord {
            name: "IT".to_string(),
            emp_id: 1,
        };
        let d = bson::to_document(&dept).unwrap();
        assert_eq!(d, doc! { "name": "IT", "emp_id": 1_i64 });
    }

    #[test]
    fn round_trip_preserves_all_fields() {
        let emp = EmployeeRecord {
            emp_id: 7,
            name: "Grace".to_string(),
            salary: 123456.78,
        };
        let d = bson::to_document(&emp).unwrap();
        let back: EmployeeRecord = bson::from_document(d).unwrap();
        assert_eq!(back, emp);
    }

    #[test]
    fn create_request_stamps_emp_id_into_related_records() {
        let req = CreateProfileRequest {
            emp_id: 1,
            name: "Alice".to_string(),
            salary: 50000.0,
            department: "IT".to_string(),
            developer_language: "Go".to_string(),
            tester_language: "JS".to_string(),
        };
        let (emp, dept, dev, tester) = req.records();
        assert_eq!(emp.emp_id, 1);
        assert_eq!(dept.emp_id, 1);
        assert_eq!(dev.emp_id, 1);
        assert_eq!(tester.emp_id, 1);
        assert_eq!(dept.name, "IT");
        assert_eq!(dev.language, "Go");
        assert_eq!(tester.language, "JS");
    }

    #[test]
    fn profile_decodes_from_aggregation_output() {
        // Shape the server produces: employee fields, an _id we ignore, and
        // the three lookup arrays.
        let doc = doc! {
            "_id": mongodb::bson::oid::ObjectId::new(),
            "id": 1_i64,
            "name": "Alice",
            "salary": 50000.0,
            "department_info": [ { "name": "IT", "emp_id": 1_i64 } ],
            "developer_info": [ { "language": "Go", "emp_id": 1_i64 } ],
            "tester_info": [ { "language": "JS", "emp_id": 1_i64 } ],
        };
        let profile: EmployeeProfile = bson::from_document(doc).unwrap();
        assert_eq!(profile.emp_id, 1);
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.salary, 50000.0);
        assert_eq!(profile.departments.len(), 1);
        assert_eq!(profile.departments[0].name, "IT");
        assert_eq!(profile.developers[0].language, "Go");
        assert_eq!(profile.testers[0].language, "JS");
    }

    #[test]
    fn profile_tolerates_missing_related_records() {
        // An orphaned employee (partial cascade) still joins, with empty arrays.
        let doc = doc! {
            "id": 2_i64,
            "name": "Bob",
            "salary": 60000.0,
            "department_info": [],
            "developer_info": [],
            "tester_info": [],
        };
        let profile: EmployeeProfile = bson::from_document(doc).unwrap();
        assert!(profile.departments.is_empty());
        assert!(profile.developers.is_empty());
        assert!(profile.testers.is_empty());
    }
}
