//! Snapshots of the textual forms the pipeline emits.

use recsynth_driver::pipeline::{execute_synthesis_pipeline, PipelineOptions};
use recsynth_macros::assert_ok;

const POINT: &str = include_str!("../../../demos/point.ron");

#[test]
fn test_point_member_signatures() {
    let opts = PipelineOptions {
        emit_members: true,
        ..Default::default()
    };
    let output = assert_ok!(execute_synthesis_pipeline(opts, POINT));
    assert_eq!(output.documents.len(), 1);
    insta::assert_snapshot!(output.documents[0], @r"
    Point:
      public Point..ctor(System.Int32 X, System.Int32 Y)
      public System.Int32 Point.X { get; init; }
      public System.Int32 Point.Y { get; init; }
      public void Point.Deconstruct(out System.Int32 X, out System.Int32 Y)
      protected Point..ctor(Point original)
      public virtual Point Point.<Clone>$()
      protected virtual System.Type Point.EqualityContract { get; }
      public virtual System.Boolean Point.Equals(Point? other)
      public override System.Boolean Point.Equals(System.Object? obj)
      public override System.Int32 Point.GetHashCode()
      public static System.Boolean Point.op_Inequality(Point? left, Point? right)
      public static System.Boolean Point.op_Equality(Point? left, Point? right)
      protected virtual System.Boolean Point.PrintMembers(System.Text.StringBuilder builder)
      public override System.String? Point.ToString()
    ");
}

#[test]
fn test_equality_operator_plan() {
    let opts = PipelineOptions {
        emit_plans: true,
        queries: vec!["member.Point.op_Inequality".to_owned()],
        ..Default::default()
    };
    let output = assert_ok!(execute_synthesis_pipeline(opts, POINT));
    assert_eq!(output.documents.len(), 1);
    let plan = &output.documents[0];
    assert!(plan.starts_with(
        "[CompilerGenerated]\npublic static System.Boolean Point.op_Inequality(Point? left, Point? right) {"
    ));
    assert!(plan.contains("return"));
    assert!(plan.contains("Point::op_Equality(left, right)"));
}
