//! Dietary guideline model
//!
//! Recommended daily servings per food group for a gender and age band.

use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{choice_column, Choice, FoodGroups, Gender, Listed, QueryParams};
use crate::store::{sql, Columns, Entity, Filter, Record};
use crate::validation::{
    choice, non_negative_integer, string, FromJson, Patch, QueryReader, ValidationError,
    Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietaryGuideline {
    pub guideline_id: i64,
    pub gender: Gender,
    pub age_group: String,
    #[serde(flatten)]
    pub servings: FoodGroups<Option<f64>>,
    pub min_age: i64,
    pub max_age: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DietaryGuidelineCreate {
    pub gender: Gender,
    pub age_group: String,
    pub servings: FoodGroups<Option<f64>>,
    pub min_age: i64,
    pub max_age: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DietaryGuidelineUpdate {
    pub gender: Patch<Gender>,
    pub age_group: Patch<String>,
    pub servings: FoodGroups<Patch<f64>>,
    pub min_age: Patch<i64>,
    pub max_age: Patch<i64>,
}

const AGE_ORDER: &str = "Must be greater than or equal to min_age.";

fn age_order_error() -> ValidationError {
    ValidationError::single("max_age", AGE_ORDER)
}

impl FromJson for DietaryGuidelineCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let gender = v.required("gender", choice::<Gender>);
        let age_group = v.required("age_group", string);
        let servings = FoodGroups::<Option<f64>>::read(&mut v);
        let min_age = v.required("min_age", non_negative_integer);
        let max_age = v.required("max_age", non_negative_integer);

        if let (Some(min), Some(max)) = (min_age, max_age) {
            if min > max {
                v.error("max_age", AGE_ORDER);
            }
        }

        v.finish(|| {
            Some(Self {
                gender: gender?,
                age_group: age_group?,
                servings,
                min_age: min_age?,
                max_age: max_age?,
            })
        })
    }
}

impl FromJson for DietaryGuidelineUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            gender: v.patch("gender", false, choice::<Gender>),
            age_group: v.patch("age_group", false, string),
            servings: FoodGroups::<Patch<f64>>::read(&mut v, true),
            min_age: v.patch("min_age", false, non_negative_integer),
            max_age: v.patch("max_age", false, non_negative_integer),
        };

        if let (Some(min), Some(max)) = (update.min_age.as_set(), update.max_age.as_set()) {
            if min > max {
                v.error("max_age", AGE_ORDER);
            }
        }
        v.finish(|| Some(update))
    }
}

impl Record for DietaryGuidelineCreate {
    fn columns(&self) -> Columns {
        let columns = Columns::new()
            .with("gender", self.gender.to_sql())
            .with("age_group", self.age_group.clone());
        self.servings
            .columns(columns)
            .with("min_age", self.min_age)
            .with("max_age", self.max_age)
    }
}

impl Record for DietaryGuidelineUpdate {
    fn columns(&self) -> Columns {
        let columns = Columns::new()
            .with_patch("gender", &self.gender, Gender::to_sql)
            .with_patch("age_group", &self.age_group, sql);
        self.servings
            .columns(columns)
            .with_patch("min_age", &self.min_age, sql)
            .with_patch("max_age", &self.max_age, sql)
    }
}

impl Entity for DietaryGuideline {
    const NAME: &'static str = "DietaryGuideline";
    const TABLE: &'static str = "dietary_guidelines";
    const ID_COLUMN: &'static str = "guideline_id";

    type Create = DietaryGuidelineCreate;
    type Update = DietaryGuidelineUpdate;

    fn id(&self) -> i64 {
        self.guideline_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            guideline_id: row.get("guideline_id")?,
            gender: choice_column(row, "gender")?,
            age_group: row.get("age_group")?,
            servings: FoodGroups::from_row(row)?,
            min_age: row.get("min_age")?,
            max_age: row.get("max_age")?,
        })
    }

    /// A partial update can move one bound past the stored other one
    fn check(&self) -> Result<(), ValidationError> {
        if self.min_age > self.max_age {
            return Err(age_order_error());
        }
        Ok(())
    }
}

impl Listed for DietaryGuideline {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let filter = Filter::new()
            .id_in("guideline_id", q.id_list("ids"))
            .equals("gender", q.choice::<Gender>("gender").map(|g| g.to_sql()))
            .covers("min_age", "max_age", q.integer("age", Some(0), None));
        q.finish()?;

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Predicate;
    use serde_json::json;

    fn guideline(min_age: i64, max_age: i64) -> DietaryGuideline {
        DietaryGuideline {
            guideline_id: 1,
            gender: Gender::F,
            age_group: "4-8".to_string(),
            servings: FoodGroups::default(),
            min_age,
            max_age,
        }
    }

    #[test]
    fn test_create_rejects_inverted_ages() {
        let err = DietaryGuidelineCreate::from_json(&json!({
            "gender": "F",
            "age_group": "4-8",
            "min_age": 8,
            "max_age": 4
        }))
        .unwrap_err();
        assert_eq!(err.messages("max_age"), [AGE_ORDER]);
    }

    #[test]
    fn test_check_catches_stored_inversion() {
        assert!(guideline(4, 8).check().is_ok());
        assert!(guideline(4, 4).check().is_ok());
        assert_eq!(guideline(9, 8).check(), Err(age_order_error()));
    }

    #[test]
    fn test_filter_by_gender_and_age() {
        let params: QueryParams = [("gender", "M"), ("age", "6")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let filter = DietaryGuideline::filter_from_query(&params).unwrap();

        assert!(matches!(
            filter.predicates(),
            [
                Predicate::Equals { column: "gender", .. },
                Predicate::Covers { value: 6, .. },
            ]
        ));
    }

    #[test]
    fn test_filter_rejects_bad_gender() {
        let params: QueryParams = [("gender".to_string(), "X".to_string())].into_iter().collect();
        let err = DietaryGuideline::filter_from_query(&params).unwrap_err();
        assert_eq!(err.messages("gender"), ["Must be one of: M, F."]);
    }
}
