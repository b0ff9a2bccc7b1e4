use mongodb::bson::{doc, Document};

use super::{DEPARTMENT, DEVELOPER, TESTER};

/// Bson field the employee id lives under in the `Employee` collection.
pub const EMPLOYEE_ID_FIELD: &str = "id";

/// Bson field the employee id lives under in the related collections.
pub const RELATED_ID_FIELD: &str = "emp_id";

/// Typed builder for one `$lookup` aggregation stage.
///
/// The join pipeline is configuration data evaluated by the server; this
/// builder keeps its construction typed instead of hand-assembling nested
/// maps, while rendering to the exact wire shape the server expects:
///
/// ```text
/// { "$lookup": { "from": ..., "localField": ...,
///                "foreignField": ..., "as": ... } }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LookupStage {
    /// Collection to pull matching records from
    from: &'static str,
    /// Field on the employee side of the join
    local_field: &'static str,
    /// Field on the related-collection side of the join
    foreign_field: &'static str,
    /// Name of the output array attached to each employee document
    output_field: &'static str,
}

impl LookupStage {
    /// Describes a join from `Employee` to one related collection.
    pub fn related(from: &'static str, output_field: &'static str) -> Self {
        Self {
            from,
            local_field: EMPLOYEE_ID_FIELD,
            foreign_field: RELATED_ID_FIELD,
            output_field,
        }
    }

    /// Renders the stage to its wire document.
    pub fn into_document(self) -> Document {
        doc! {
            "$lookup": {
                "from": self.from,
                "localField": self.local_field,
                "foreignField": self.foreign_field,
                "as": self.output_field,
            }
        }
    }
}

/// The fixed three-stage pipeline producing the joined profile view.
///
/// Run against the `Employee` collection, it attaches every matching
/// Department, Developer and Tester record to each employee. Equivalent to
/// a left outer join keyed on employee id: employees with no related
/// records come back with empty arrays rather than being dropped.
pub fn profile_pipeline() -> Vec<Document> {
    [
        LookupStage::related(DEPARTMENT, "department_info"),
        LookupStage::related(DEVELOPER, "developer_info"),
        LookupStage::related(TESTER, "tester_info"),
    ]
    .into_iter()
    .map(LookupStage::into_document)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_stage_renders_wire_shape() {
        let stage = LookupStage::related(DEPARTMENT, "department_info").into_document();
        assert_eq!(
            stage,
            doc! {
                "$lookup": {
                    "from": "Department",
                    "localField": "id",
                    "foreignField": "emp_id",
                    "as": "department_info",
                }
            }
        );
    }

    #[test]
    fn profile_pipeline_joins_all_three_collections() {
        let pipeline = profile_pipeline();
        assert_eq!(pipeline.len(), 3);

        let froms: Vec<&str> = pipeline
            .iter()
            .map(|stage| {
                stage
                    .get_document("$lookup")
                    .unwrap()
                    .get_str("from")
                    .unwrap()
            })
            .collect();
        assert_eq!(froms, vec!["Department", "Developer", "Tester"]);

        // Every stage bridges the employee-side "id" to the related "emp_id".
        for stage in &pipeline {
            let lookup = stage.get_document("$lookup").unwrap();
            assert_eq!(lookup.get_str("localField").unwrap(), EMPLOYEE_ID_FIELD);
            assert_eq!(lookup.get_str("foreignField").unwrap(), RELATED_ID_FIELD);
        }
    }
}
