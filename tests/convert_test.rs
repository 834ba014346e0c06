//! End-to-end conversion tests over full Markdown documents.

use gridclerk::{
    convert_markdown, convert_markdown_with_options, to_json, ConvertOptions, DocumentData,
    DocumentType, JsonFormat,
};

const FS_REVIEW_DOC: &str = "\
# 国网山西省电力公司关于晋城周村220kV输变电工程可行性研究报告的评审意见

<table>
<tr><td>序号</td><td>工程或费用名称</td><td>静态投资</td><td>动态投资</td></tr>
<tr><td>一</td><td>变电工程</td><td>5,000.00</td><td>5,200.00</td></tr>
<tr><td>1</td><td>晋城周村220kV变电站新建工程</td><td>3,000.00</td><td>3,100.00</td></tr>
<tr><td>2</td><td>凤城220kV变电站220kV间隔扩建工程</td><td>2,000.00</td><td>2,100.00</td></tr>
<tr><td>二</td><td>其他费用</td><td>400.00</td><td>400.00</td></tr>
<tr><td></td><td>其中:建设场地征用及清理费</td><td>120.00</td><td>120.00</td></tr>
<tr><td></td><td>合计</td><td>5,400.00</td><td>5,600.00</td></tr>
</table>
";

/// Sample scenario A: a Chinese-numeral row roots two Arabic-numeral rows.
#[test]
fn test_tier_one_roots_tier_two_children() {
    let result = convert_markdown(FS_REVIEW_DOC);
    assert_eq!(result.document_type, "fsReview");
    let DocumentData::Investment(nodes) = &result.data else {
        panic!("expected investment payload");
    };

    let root = &nodes[0];
    assert_eq!(root.name, "变电工程");
    assert_eq!(root.level, 1);
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].name, "晋城周村220kV变电站新建工程");
    assert_eq!(root.children[0].level, 2);
    assert_eq!(root.children[1].name, "凤城220kV变电站220kV间隔扩建工程");
}

/// Sample scenario B: a 其中: row nests under the preceding tier-1 row with
/// the prefix stripped.
#[test]
fn test_among_which_nests_and_strips_prefix() {
    let result = convert_markdown(FS_REVIEW_DOC);
    let DocumentData::Investment(nodes) = &result.data else {
        panic!("expected investment payload");
    };

    let other = nodes.iter().find(|n| n.name == "其他费用").unwrap();
    assert_eq!(other.level, 1);
    assert_eq!(other.children.len(), 1);
    let child = &other.children[0];
    assert_eq!(child.name, "建设场地征用及清理费");
    assert_eq!(child.level, 2);
}

/// The stripping invariant holds over the serialized output as a whole.
#[test]
fn test_no_among_which_prefix_survives() {
    let result = convert_markdown(FS_REVIEW_DOC);
    let json = to_json(&result, JsonFormat::Compact).unwrap();
    assert!(!json.contains("其中:"));
    assert!(!json.contains("其中："));
}

/// Sample scenario C: unknown title yields exactly the published payload.
#[test]
fn test_unknown_document_payload() {
    let result = convert_markdown("# 一份无法归类的文档\n正文。");
    let json = to_json(&result, JsonFormat::Compact).unwrap();
    assert_eq!(
        json,
        "{\"document_type\":\"unknown\",\"data\":{},\"error\":\"无法识别的文档类型\"}"
    );
}

/// Idempotence: byte-identical JSON across repeated runs.
#[test]
fn test_idempotent_output() {
    let first = to_json(&convert_markdown(FS_REVIEW_DOC), JsonFormat::Pretty).unwrap();
    let second = to_json(&convert_markdown(FS_REVIEW_DOC), JsonFormat::Pretty).unwrap();
    assert_eq!(first, second);

    // Parallel and sequential reconstruction agree byte for byte.
    let sequential = to_json(
        &convert_markdown_with_options(FS_REVIEW_DOC, &ConvertOptions::new().sequential()),
        JsonFormat::Pretty,
    )
    .unwrap();
    assert_eq!(first, sequential);
}

/// Level monotonicity across every parent/child edge of the output forest.
#[test]
fn test_level_monotonicity() {
    fn check(nodes: &[gridclerk::schema::InvestmentNode]) {
        for node in nodes {
            for child in &node.children {
                assert_eq!(child.level, node.level + 1);
            }
            check(&node.children);
        }
    }
    let result = convert_markdown(FS_REVIEW_DOC);
    let DocumentData::Investment(nodes) = &result.data else {
        panic!("expected investment payload");
    };
    check(nodes);
}

/// The 合计 roll-up stays a root-level leaf.
#[test]
fn test_total_rollup_is_root_leaf() {
    let result = convert_markdown(FS_REVIEW_DOC);
    let DocumentData::Investment(nodes) = &result.data else {
        panic!("expected investment payload");
    };
    let total = nodes.iter().find(|n| n.name == "合计").unwrap();
    assert_eq!(total.level, 0);
    assert!(total.children.is_empty());
    assert_eq!(total.static_investment.as_number(), Some(5400.0));
}

#[test]
fn test_fs_approval_document_with_merged_header() {
    // Scale columns under a merged 建设规模 header cell.
    let md = "\
国网山西省电力公司关于晋城周村220kV输变电工程可行性研究报告的批复

<table>
<tr><td rowspan=\"2\">序号</td><td rowspan=\"2\">工程或费用名称</td><td colspan=\"4\">建设规模</td><td rowspan=\"2\">静态投资</td><td rowspan=\"2\">动态投资</td></tr>
<tr><td>架空线(km)</td><td>间隔(个)</td><td>变电(MVA)</td><td>光缆(km)</td></tr>
<tr><td>一</td><td>变电工程</td><td></td><td>2</td><td>360</td><td></td><td>5,000.00</td><td>5,200.00</td></tr>
<tr><td>1</td><td>晋城周村220kV变电站新建工程</td><td></td><td>2</td><td>360</td><td></td><td>3,000.00</td><td>3,100.00</td></tr>
</table>
";
    let result = convert_markdown(md);
    assert_eq!(result.document_type, "fsApproval");
    let DocumentData::FsApproval(nodes) = &result.data else {
        panic!("expected fsApproval payload");
    };
    assert_eq!(nodes.len(), 1);
    let root = &nodes[0];
    assert_eq!(root.construction_scale_bay, "2");
    assert_eq!(root.construction_scale_substation, "360");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].static_investment.as_number(), Some(3000.0));
}

#[test]
fn test_final_account_document() {
    let md = "\
# 晋城周村220kV输变电工程竣工决算审核报告

一、晋城周村220kV变电站新建工程
建筑安装费 1,200.00 900.00 300.00 25.00%
设备费 800.00 1,024.24 -224.24 -28.03% 超概算
";
    let result = convert_markdown(md);
    assert_eq!(result.document_type, "finalAccount");
    let DocumentData::FinalAccount(groups) = &result.data else {
        panic!("expected finalAccount payload");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items[1].variance_rate, "-28.03%");
    assert_eq!(groups[0].items[1].variance, "-224.24");
}

#[test]
fn test_record_type_is_labeled_only() {
    let md = "污染源噪声检测原始记录表\n<table><tr><td>点位</td></tr></table>";
    let result = convert_markdown(md);
    let json = to_json(&result, JsonFormat::Compact).unwrap();
    assert_eq!(json, "{\"document_type\":\"noiseRec\",\"data\":{}}");
}

#[test]
fn test_explicit_type_skips_detection() {
    let options = ConvertOptions::new().with_document_type(DocumentType::FsReview);
    let result = convert_markdown_with_options("无标题表格文档", &options);
    assert_eq!(result.document_type, "fsReview");
    assert!(!result.is_unknown());
}
