use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnId(pub u32);

/// A chart column: a leaf of the template hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
}

/// A node in the hierarchical chart template (e.g. "Nucleus" grouping "Subject" and "Verb").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    pub name: String,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<TemplateNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// A root whose direct children are the given columns.
    pub fn flat<S: AsRef<str>>(names: &[S]) -> Self {
        Self::group(
            "Template",
            names.iter().map(|n| TemplateNode::leaf(n.as_ref())).collect(),
        )
    }
}

/// Depth-first leaves of `template`. The root is never a column, even when it has no children.
pub fn collect_columns(template: &TemplateNode) -> Vec<Column> {
    fn walk(node: &TemplateNode, out: &mut Vec<Column>) {
        if node.children.is_empty() {
            out.push(Column {
                id: ColumnId(out.len() as u32),
                name: node.name.clone(),
            });
            return;
        }
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut columns = Vec::new();
    for child in &template.children {
        walk(child, &mut columns);
    }
    columns
}

/// Linear scan of the fixed column list.
pub fn index_of_column(columns: &[Column], id: ColumnId) -> Option<usize> {
    columns.iter().position(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_columns_takes_leaves_depth_first() {
        let template = TemplateNode::group(
            "root",
            vec![
                TemplateNode::leaf("Prenuclear"),
                TemplateNode::group(
                    "Nucleus",
                    vec![TemplateNode::leaf("Subject"), TemplateNode::leaf("Verb")],
                ),
                TemplateNode::leaf("Postnuclear"),
            ],
        );

        let names: Vec<_> = collect_columns(&template)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Prenuclear", "Subject", "Verb", "Postnuclear"]);
    }

    #[test]
    fn test_root_without_children_has_no_columns() {
        assert!(collect_columns(&TemplateNode::leaf("root")).is_empty());
    }

    #[test]
    fn test_index_of_column() {
        let columns = collect_columns(&TemplateNode::flat(&["A", "B", "C"]));
        assert_eq!(index_of_column(&columns, ColumnId(2)), Some(2));
        assert_eq!(index_of_column(&columns, ColumnId(9)), None);
    }
}
