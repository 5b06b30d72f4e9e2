/// `(section, canonical title, source-language alias, rule text)` for the
/// GJB 438C Appendix J software requirements specification outline.
pub(super) const APPENDIX_J: &[(&str, &str, &str, &str)] = &[
    (
        "1",
        "Scope",
        "范围",
        "Scope: This section shall give the complete identification of the system and software to which this document applies, including identification number, title, abbreviation, version number and release number; summarise the purpose of the system and software; describe their general nature; summarise the history of development, operation and maintenance; identify the acquirer, user, developer and support agencies; identify current and planned operating sites; list other relevant documents; and summarise the purpose and contents of this document and any security or privacy considerations associated with its use.",
    ),
    (
        "1.1",
        "Identification",
        "标识",
        "Identification: This paragraph shall contain the complete identification of the system and software to which this document applies, including, as applicable, identification number, title, abbreviation, version number and release number.",
    ),
    (
        "1.2",
        "System overview",
        "系统概述",
        "System overview: This paragraph shall summarise the purpose of the system and software; describe their general nature (such as size, safety, reliability, real-time behaviour and technical risk); summarise the history of development, operation and maintenance; identify the acquirer, user, developer and support agencies; identify current and planned operating sites; and list other relevant documents.",
    ),
    (
        "1.3",
        "Document overview",
        "文档概述",
        "Document overview: This paragraph shall summarise the purpose and contents of this document and describe any security or privacy considerations associated with its use.",
    ),
    (
        "2",
        "Referenced documents",
        "引用文档",
        "Referenced documents: This section shall list the number, title, originating organisation, revision and date of all documents referenced in this specification, and identify the source of documents not available through normal channels.",
    ),
    (
        "3",
        "Requirements",
        "需求",
        "Requirements: This section shall be divided into the following paragraphs to specify the CSCI requirements, that is, the characteristics of the CSCI that are conditions for its acceptance. CSCI requirements are software requirements generated to satisfy the system requirements allocated to this CSCI. Each requirement shall be assigned a project-unique identifier to support testing and traceability and shall be stated in such a way that an objective test can be defined for it. Each requirement shall be annotated with its qualification method (see section 4) and its traceability to system or subsystem requirements (or that traceability shall be given in section 5).",
    ),
    (
        "3.1",
        "Required states and modes",
        "要求的状态和方式",
        "Required states and modes: If the CSCI is required to operate in more than one state or mode having requirements distinct from other states or modes, this paragraph shall identify and define each state and mode. Examples include idle, ready, active, post-use analysis, training, degraded, emergency, backup, wartime and peacetime. The CSCI may be described in terms of states only, modes only, states within modes, modes within states, or any other useful scheme. If no states or modes are required, this paragraph shall say so without artificial distinction. If states and/or modes are required, each requirement or group of requirements in this specification shall be correlated to them, by table or other method in this paragraph, in an appendix referenced from it, or where the requirement appears.",
    ),
    (
        "3.2",
        "CSCI capability requirements",
        "CSCI能力需求",
        "CSCI capability requirements: This paragraph shall itemise the requirements associated with each capability of the CSCI and may be divided into subparagraphs. The word capability denotes a group of related requirements and may be replaced by function, subject, object, or another term suited to presenting the requirements.",
    ),
    (
        "3.3",
        "CSCI external interface requirements",
        "CSCI外部接口需求",
        "CSCI external interface requirements: This paragraph may be divided into subparagraphs specifying the requirements, if any, for the external interfaces of the CSCI. It may reference one or more Interface Requirements Specifications (IRSs) or other documents containing these requirements.",
    ),
    (
        "3.4",
        "CSCI internal interface requirements",
        "CSCI内部接口需求",
        "CSCI internal interface requirements: This paragraph shall specify the requirements, if any, imposed on interfaces internal to the CSCI. If all internal interfaces are left to the design, this fact shall be so stated. If such requirements are imposed, they shall be described as in 3.3.",
    ),
    (
        "3.5",
        "CSCI internal data requirements",
        "CSCI内部数据需求",
        "CSCI internal data requirements: This paragraph shall specify the requirements, if any, imposed on data internal to the CSCI, including databases and data files. If all decisions about internal data are left to the design, this fact shall be so stated. If such requirements are imposed, they shall be described as in 3.3.x c) and 3.3.x d).",
    ),
    (
        "3.6",
        "Adaptation requirements",
        "适应性需求",
        "Adaptation requirements: This paragraph shall specify the requirements, if any, concerning installation-dependent data provided by the CSCI (such as site latitude and longitude or site codes) and the operational parameters the CSCI is required to use that may vary according to operational needs (such as target settings or data recording parameters).",
    ),
    (
        "3.7",
        "Security requirements",
        "保密性需求",
        "Security requirements: This paragraph shall specify the CSCI requirements, if any, concerned with maintaining security, including as applicable the security environment in which the CSCI must operate, the type and degree of security to be provided, the security risks the CSCI must withstand, required safeguards to reduce those risks, the security policy that must be met, the security accountability the CSCI must provide, and the criteria that must be met for security certification and accreditation.",
    ),
    (
        "3.8",
        "Safety requirements",
        "安全性需求",
        "Safety requirements: This paragraph shall specify the CSCI requirements, if any, concerned with preventing or minimising unintended hazards to personnel, property and the physical environment. Examples include safeguards the CSCI must provide to prevent inadvertent actions (such as accidentally issuing an auto-pilot off command) and non-actions (such as failure to issue an intended auto-pilot off command). It shall also include CSCI requirements, if any, regarding nuclear components of the system, including prevention of inadvertent detonation and compliance with nuclear safety rules.",
    ),
    (
        "3.9",
        "CSCI environment requirements",
        "CSCI环境适应性需求",
        "CSCI environment requirements: This paragraph shall specify the requirements, if any, regarding the environment in which the CSCI must operate, for example the computer hardware and operating system on which it runs (other computer resource requirements are given in 3.11).",
    ),
    (
        "3.10",
        "Other quality characteristics",
        "其他质量特性",
        "Other quality characteristics: This paragraph shall specify the CSCI requirements, if any, pertaining to quality characteristics that are contractually required or derived from a higher-level specification, including reliability, testability and maintainability.",
    ),
    (
        "3.11",
        "Computer resource requirements",
        "计算机资源需求",
        "Computer resource requirements: This paragraph shall specify the computer hardware the CSCI must use, computer hardware resource utilisation requirements, computer software requirements and computer communications requirements.",
    ),
    (
        "3.12",
        "Design and implementation constraints",
        "设计和实现约束",
        "Design and implementation constraints: This paragraph shall specify the requirements, if any, that constrain the design and implementation of the CSCI. These requirements may be specified by reference to appropriate commercial or military standards and specifications.",
    ),
    (
        "3.13",
        "Personnel-related requirements",
        "人员相关需求",
        "Personnel-related requirements: This paragraph shall specify the CSCI requirements, if any, for accommodating the number, skill levels, duty cycles, training needs and other information about the personnel who will use or support the CSCI, such as the number of simultaneous users and built-in help or training features, together with any human factors engineering requirements imposed on the CSCI.",
    ),
    (
        "3.14",
        "Training-related requirements",
        "训练相关需求",
        "Training-related requirements: This paragraph shall specify the CSCI requirements, if any, pertaining to training, such as training software included in the CSCI.",
    ),
    (
        "3.15",
        "Software support requirements",
        "软件保障需求",
        "Software support requirements: This paragraph shall specify the CSCI requirements, if any, concerned with support considerations, which may include system maintenance, software support, system transportation modes, supply-system requirements, and impact on existing facilities and equipment.",
    ),
    (
        "3.16",
        "Packaging requirements",
        "包装需求",
        "Packaging requirements: This paragraph shall specify the requirements, if any, for packaging, labelling and handling the CSCI for delivery (for example delivery on optical media labelled and packaged in a specified way), and may reference applicable standards.",
    ),
    (
        "3.17",
        "Other requirements",
        "其他需求",
        "Other requirements: This paragraph shall specify any additional CSCI requirements not covered by the previous paragraphs.",
    ),
    (
        "3.18",
        "Precedence and criticality of requirements",
        "需求的优先顺序和关键性",
        "Precedence and criticality of requirements: If applicable, this paragraph shall specify the order of precedence, criticality, or assigned weights indicating the relative importance of the requirements in this specification, for example identifying requirements critical to safety or security for special treatment. If all requirements have equal weight, this paragraph shall so state.",
    ),
    (
        "4",
        "Qualification provisions",
        "合格性规定",
        "Qualification provisions: This section shall define a set of qualification methods and specify for each requirement in section 3 the method used to ensure that the requirement has been met. A table may be used, or each requirement in section 3 may be annotated with its method.",
    ),
    (
        "5",
        "Requirements traceability",
        "需求可追踪性",
        "Requirements traceability: This section shall describe traceability from each CSCI requirement in this specification to the system or subsystem requirements it addresses, and from each system or subsystem requirement allocated to this CSCI to the CSCI requirements that address it.",
    ),
    (
        "6",
        "Notes",
        "注释",
        "Notes: This section shall contain any general information that aids in understanding this document, such as background, terms, abbreviations and formulas.",
    ),
];
