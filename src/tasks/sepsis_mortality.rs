use super::EvaluationTask;
use crate::evaluation::{LossKind, Metric};
use crate::optimizer::{ParamValue, SearchSpace};
use crate::preprocessing::{ColumnRoles, ContinuousColumns};
use crate::training::RandomForestFactory;

/// Binary in-hospital mortality with a random forest; every feature is scaled
pub fn sepsis_mortality() -> EvaluationTask {
    let search_space = SearchSpace::new()
        .add("n_estimators", vec![30i64, 100, 200])
        .add("max_depth", vec![3i64, 5, 10])
        .add("max_features", vec![ParamValue::None, ParamValue::from("sqrt")]);

    EvaluationTask {
        name: "sepsis_mortality".to_string(),
        factory: Box::new(RandomForestFactory),
        search_space,
        loss: LossKind::Binary,
        metrics: vec![Metric::CrossEntropy(LossKind::Binary)],
        roles: ColumnRoles::new("mortality_indicator", ContinuousColumns::AllFeatures),
        dataset_file: "sepsis_mortality_baselines_data.csv".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid() {
        let task = sepsis_mortality();
        assert_eq!(task.method_name(), "random_forest");
        assert_eq!(task.search_space.n_combinations(), 18);
        assert_eq!(task.metrics, vec![Metric::CrossEntropy(LossKind::Binary)]);
    }
}
