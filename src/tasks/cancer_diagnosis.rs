use super::EvaluationTask;
use crate::evaluation::{LossKind, Metric};
use crate::optimizer::SearchSpace;
use crate::preprocessing::{ColumnRoles, ContinuousColumns};
use crate::training::LogisticRegressionFactory;

const CATEGORICAL: [&str; 10] = [
    "FamilyHistory",
    "BetelNut",
    "Drinking",
    "Smoking",
    "Diabetes",
    "Hypertension",
    "gender",
    "Nitrite",
    "Urine Bilirubin",
    "Disease",
];

/// Multiclass cancer diagnosis with multinomial logistic regression
pub fn cancer_diagnosis() -> EvaluationTask {
    let search_space = SearchSpace::new()
        .add("C", vec![0.0001, 0.001, 0.01, 0.1])
        .add("penalty", vec!["l2"])
        .add("max_iter", vec![200i64]);

    EvaluationTask {
        name: "cancer_diagnosis".to_string(),
        factory: Box::new(LogisticRegressionFactory),
        search_space,
        loss: LossKind::Categorical,
        metrics: vec![Metric::CrossEntropy(LossKind::Categorical), Metric::F1Micro],
        roles: ColumnRoles::new("Disease", ContinuousColumns::Remaining).with_categorical(CATEGORICAL),
        dataset_file: "cancer_diagnosis_baselines_data.csv".to_string(),
    }
}
